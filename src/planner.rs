//! Composition planner: decides, per layer, whether dedicated display
//! hardware or the compositor's own merge path handles it.

use crate::diagnostics::dump_layer;
use crate::foundation::error::CompositorResult;
use crate::layer::{CompositionType, Layer, LayerList};

/// Classification strategy for non-base layers.
///
/// Real hardware constrains how many and which layers its overlay planes
/// can take; that decision belongs to the platform, so it sits behind
/// this trait rather than in the planner itself.
pub trait CompositionPolicy {
    /// Composition type for the layer at `index` (always > 0).
    fn classify(&self, index: usize, layer: &Layer) -> CompositionType;
}

/// Policy that marks every non-base layer [`CompositionType::Overlay`].
///
/// With this policy nothing is ever deferred to real display hardware:
/// every overlay-classified layer ends up on the compositor's own
/// accelerator/software merge path.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayAll;

impl CompositionPolicy for OverlayAll {
    fn classify(&self, _index: usize, _layer: &Layer) -> CompositionType {
        CompositionType::Overlay
    }
}

/// Classify the layers of one pass in place.
///
/// No-op unless the list has more than one layer and its geometry changed
/// since the last pass; otherwise the previous classification is assumed
/// stable. Index 0 keeps its composition type. Every layer is dumped, a
/// source/display dimension mismatch is flagged as a scaling need
/// (diagnostic only), and each non-null buffer descriptor is validated;
/// a failed validation fails the pass before any pixel work.
///
/// Afterwards every layer in the list has a defined composition type; no
/// buffer contents are modified.
#[tracing::instrument(skip(list, policy), fields(layers = list.layers.len()))]
pub fn plan(list: &mut LayerList, policy: &dyn CompositionPolicy) -> CompositorResult<()> {
    if list.layers.len() <= 1 || !list.geometry_changed {
        return Ok(());
    }

    for (index, layer) in list.layers.iter_mut().enumerate() {
        dump_layer(index, layer);
        if index > 0 {
            layer.composition_type = policy.classify(index, layer);
        }
        if layer.needs_scaling() {
            tracing::debug!(index, "needs scaling");
        }
        if let Some(buffer) = &layer.buffer {
            buffer.validate()?;
        }
    }

    Ok(())
}
