//! Layerblit is a display-compositor core that merges independent
//! pixel-buffer layers into a single destination surface.
//!
//! # Composition pass
//!
//! 1. **Plan**: classify each non-base layer (`LayerList` →
//!    [`CompositionType`] per layer), gated on the list's geometry-changed
//!    flag.
//! 2. **Merge**: blit every non-base layer into the base layer's buffer,
//!    through a hardware [`BlitChannel`] when one is open and a
//!    bounds-checked software word copy otherwise.
//! 3. **Publish**: hand the composed base surface to the
//!    [`FramePublisher`].
//!
//! The key design constraints:
//!
//! - **Single-threaded, synchronous**: passes are issued sequentially by
//!   the host runtime; the accelerator call blocks until the copy is done.
//! - **Accelerator is optional**: an unavailable or failing channel
//!   degrades to the software path and is never surfaced as an error.
//! - **Every software pixel access is bounds-checked**: buffers are
//!   externally allocated and arbitrarily sized; all reads and writes go
//!   through one audited check ([`BufferView`]), and a violation aborts
//!   that layer's merge with a typed [`CompositorError::OutOfBounds`].
//! - **No blending, scaling, or color conversion**: the core copies
//!   pixels; a source/display dimension mismatch is logged as a scaling
//!   need and otherwise ignored.
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod blit;
mod buffer;
mod compose;
mod diagnostics;
mod foundation;
mod layer;
mod planner;

pub use blit::channel::{BlitChannel, BlitRequest, ChannelError, NullChannel};
#[cfg(unix)]
pub use blit::channel::{DEFAULT_DEVICE_PATH, DeviceChannel};
pub use blit::engine::{MergeOutcome, merge};
pub use buffer::descriptor::{AccelBufferId, BufferDescriptor};
pub use buffer::view::BufferView;
pub use compose::{Compositor, DisplayHandle, FramePublisher, SurfaceHandle};
pub use foundation::error::{BufferRole, CompositorError, CompositorResult};
pub use foundation::geometry::PixelRect;
pub use layer::{BlendMode, CompositionType, Layer, LayerFlags, LayerList, TransformFlags};
pub use planner::{CompositionPolicy, OverlayAll, plan};
