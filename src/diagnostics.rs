//! Per-layer diagnostics emitted during planning and pass execution.

use crate::layer::Layer;

/// One debug event carrying a layer's full composition state, emitted for
/// every layer of a pass so a log capture reconstructs what was composed.
pub(crate) fn dump_layer(index: usize, layer: &Layer) {
    let stride = layer
        .buffer
        .as_ref()
        .map_or(-1, |buffer| i64::from(buffer.stride()));
    tracing::debug!(
        index,
        composition_type = ?layer.composition_type,
        flags = layer.flags.bits(),
        transform = layer.transform.bits(),
        blend = ?layer.blend,
        source = ?layer.source_rect,
        display = ?layer.display_rect,
        stride,
        "layer"
    );
}
