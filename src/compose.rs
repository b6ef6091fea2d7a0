//! The compositor instance and the composition pass driver.

use crate::blit::channel::BlitChannel;
#[cfg(unix)]
use crate::blit::channel::{DEFAULT_DEVICE_PATH, NullChannel};
use crate::blit::engine::merge;
use crate::diagnostics::dump_layer;
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::layer::LayerList;
use crate::planner::{CompositionPolicy, OverlayAll, plan};

/// Opaque display identifier handed through to the frame publisher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DisplayHandle(pub u64);

/// Opaque surface identifier handed through to the frame publisher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SurfaceHandle(pub u64);

/// Publishes a composed base buffer to the screen.
///
/// External presentation primitive; its failure is the only hardware
/// condition a composition pass propagates.
pub trait FramePublisher {
    /// Present the display/surface pair.
    fn present(&mut self, display: DisplayHandle, surface: SurfaceHandle) -> anyhow::Result<()>;
}

/// Process-lifetime compositor instance.
///
/// Owns the accelerator channel, the frame publisher, and the
/// classification policy for its lifetime. Carries no per-pass state, so
/// every pass is independent given the layer list it receives; the host
/// runtime is expected to issue passes sequentially on one thread.
pub struct Compositor {
    channel: Box<dyn BlitChannel>,
    publisher: Box<dyn FramePublisher>,
    policy: Box<dyn CompositionPolicy>,
}

impl Compositor {
    /// Wire a compositor from explicit collaborators, with the default
    /// classification policy.
    pub fn new(channel: Box<dyn BlitChannel>, publisher: Box<dyn FramePublisher>) -> Self {
        Self {
            channel,
            publisher,
            policy: Box::new(OverlayAll),
        }
    }

    /// Replace the classification policy.
    pub fn with_policy(mut self, policy: Box<dyn CompositionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Open the well-known accelerator device node, degrading to the
    /// software-only channel when it cannot be opened.
    #[cfg(unix)]
    pub fn open(publisher: Box<dyn FramePublisher>) -> Self {
        Self::open_at(DEFAULT_DEVICE_PATH, publisher)
    }

    /// Open a specific accelerator device node, degrading to the
    /// software-only channel when it cannot be opened. Unavailability is
    /// a non-fatal degraded mode, recorded in the logs.
    #[cfg(unix)]
    pub fn open_at(path: impl AsRef<std::path::Path>, publisher: Box<dyn FramePublisher>) -> Self {
        use crate::blit::channel::DeviceChannel;

        let path = path.as_ref();
        let channel: Box<dyn BlitChannel> = match DeviceChannel::open(path) {
            Ok(device) => Box::new(device),
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "accelerator disabled");
                Box::new(NullChannel)
            }
        };
        Self::new(channel, publisher)
    }

    /// Classify the layers of one pass; see [`plan`].
    pub fn prepare(&self, list: &mut LayerList) -> CompositorResult<()> {
        plan(list, self.policy.as_ref())
    }

    /// Execute one composition pass: classify (when geometry changed),
    /// merge every non-base layer into the base surface, then publish.
    ///
    /// Merging is best-effort across layers: a bounds violation aborts
    /// only the offending layer's merge, later layers still merge, and
    /// the frame is still published. The first such error is returned
    /// after the pass so callers can detect partial composition. A
    /// publisher failure maps to [`CompositorError::Presentation`] and
    /// takes precedence over any recorded merge error.
    #[tracing::instrument(skip_all, fields(layers = list.layers.len(), display = ?display_handle, surface = ?surface_handle))]
    pub fn compose(
        &mut self,
        display_handle: DisplayHandle,
        surface_handle: SurfaceHandle,
        list: &mut LayerList,
    ) -> CompositorResult<()> {
        let mut deferred: Option<CompositorError> = None;

        if list.layers.len() > 1 {
            self.prepare(list)?;

            if let Some((base, overlays)) = list.layers.split_first() {
                dump_layer(0, base);
                for (offset, overlay) in overlays.iter().enumerate() {
                    dump_layer(offset + 1, overlay);
                    if let Err(error) = merge(base, overlay, self.channel.as_ref()) {
                        tracing::debug!(%error, index = offset + 1, "merge aborted");
                        deferred.get_or_insert(error);
                    }
                }
            }
        }

        self.publisher
            .present(display_handle, surface_handle)
            .map_err(|error| CompositorError::presentation(error.to_string()))?;

        match deferred {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
