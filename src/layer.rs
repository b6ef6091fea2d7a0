//! Layers and layer lists: the per-pass input handed to the compositor by
//! the host runtime.

use std::rc::Rc;

use crate::buffer::descriptor::BufferDescriptor;
use crate::foundation::geometry::PixelRect;

/// How one layer is handled during a composition pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompositionType {
    /// The compositor itself merges the layer into the base surface.
    #[default]
    Framebuffer,
    /// The layer is handed to dedicated display hardware; the compositor
    /// performs no pixel work for it.
    Overlay,
}

/// Blend state requested for a layer.
///
/// Recognized and dumped; the core copies pixels and performs no blending
/// math.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    /// Opaque copy, no blending.
    #[default]
    None,
    /// Source pixels carry premultiplied alpha.
    Premultiplied,
    /// Source alpha is a coverage mask.
    Coverage,
}

bitflags::bitflags! {
    /// Per-layer hint flags set by the host runtime.
    ///
    /// Recognized and dumped; not acted upon by this core.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LayerFlags: u32 {
        /// The host already handled this layer elsewhere.
        const SKIP = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Transform requested for a layer.
    ///
    /// Recognized and dumped; this core performs no transforms.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TransformFlags: u32 {
        /// Mirror horizontally.
        const FLIP_H = 1 << 0;
        /// Mirror vertically.
        const FLIP_V = 1 << 1;
        /// Rotate 90 degrees clockwise.
        const ROT_90 = 1 << 2;
        /// Rotate 180 degrees.
        const ROT_180 = Self::FLIP_H.bits() | Self::FLIP_V.bits();
        /// Rotate 270 degrees clockwise.
        const ROT_270 = Self::FLIP_H.bits() | Self::FLIP_V.bits() | Self::ROT_90.bits();
    }
}

/// One rectangular visual element of a composition pass.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Assigned by the planner; read by the blit engine and the display
    /// hardware path.
    pub composition_type: CompositionType,
    /// Host hint flags.
    pub flags: LayerFlags,
    /// Requested transform.
    pub transform: TransformFlags,
    /// Requested blend state.
    pub blend: BlendMode,
    /// Rectangle read from the layer's own buffer.
    pub source_rect: PixelRect,
    /// Placement rectangle in the destination surface's pixel space.
    pub display_rect: PixelRect,
    /// Backing buffer; `None` is a valid nothing-to-draw state.
    pub buffer: Option<Rc<BufferDescriptor>>,
}

impl Layer {
    /// Build a layer with default classification, flags, and blend state.
    pub fn new(
        source_rect: PixelRect,
        display_rect: PixelRect,
        buffer: Option<Rc<BufferDescriptor>>,
    ) -> Self {
        Self {
            composition_type: CompositionType::default(),
            flags: LayerFlags::default(),
            transform: TransformFlags::default(),
            blend: BlendMode::default(),
            source_rect,
            display_rect,
            buffer,
        }
    }

    /// Whether display and source dimensions differ, implying a scaling
    /// step this core does not perform. Diagnostic only.
    pub fn needs_scaling(&self) -> bool {
        !self.display_rect.same_dimensions(self.source_rect)
    }
}

/// Ordered layers for one composition pass.
///
/// The layer at index 0 is the base/destination surface into which every
/// later layer is merged. `geometry_changed` gates reclassification: the
/// caller must set it whenever layer geometry or content organization
/// actually changed, since the planner otherwise assumes the previous
/// classification still holds.
#[derive(Clone, Debug, Default)]
pub struct LayerList {
    /// Layers in composition order.
    pub layers: Vec<Layer>,
    /// Set by the caller when geometry changed since the last pass.
    pub geometry_changed: bool,
}

impl LayerList {
    /// Build a list with `geometry_changed` set, as on a first pass.
    pub fn new(layers: Vec<Layer>) -> Self {
        Self {
            layers,
            geometry_changed: true,
        }
    }

    /// The base/destination layer, if the list is non-empty.
    pub fn base(&self) -> Option<&Layer> {
        self.layers.first()
    }
}
