use crate::buffer::descriptor::AccelBufferId;

/// One rectangular buffer-to-buffer copy request in accelerator terms.
///
/// Offsets are in bytes (4 bytes per pixel); strides and counts are in
/// pixels. The accelerator addresses buffers by [`AccelBufferId`], never
/// by the compositor's own view of their memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlitRequest {
    /// Destination buffer in the accelerator's namespace.
    pub dst: AccelBufferId,
    /// Byte offset of the destination write origin.
    pub dst_offset: u64,
    /// Destination row pitch in pixels.
    pub dst_stride: u32,
    /// Source buffer in the accelerator's namespace.
    pub src: AccelBufferId,
    /// Byte offset of the source read origin.
    pub src_offset: u64,
    /// Source row pitch in pixels.
    pub src_stride: u32,
    /// Pixels per copied row.
    pub columns: u32,
    /// Number of copied rows.
    pub rows: u32,
}

/// Errors internal to the accelerator channel.
///
/// These never cross the crate boundary: the blit engine logs them and
/// falls back to the software copy, since the accelerator is a
/// performance optimization and never a correctness dependency.
#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    /// No accelerator device was opened for this compositor instance.
    #[error("accelerator channel unavailable")]
    Unavailable,
    /// The device accepted the submission but reported a failure status.
    #[error("accelerator rejected request with status {status}")]
    Device {
        /// Raw status returned by the device.
        status: i32,
    },
    /// Opening or talking to the device node failed at the OS level.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A rectangular-copy accelerator reachable by the compositor.
///
/// Two implementations ship with the crate: [`DeviceChannel`] drives the
/// kernel bit-blit device, and [`NullChannel`] reports unavailability so
/// every merge takes the software path. Hosts and tests substitute their
/// own implementations at compositor construction.
///
/// [`DeviceChannel`]: crate::DeviceChannel
pub trait BlitChannel {
    /// Submit one rectangular copy; blocks until the copy is complete.
    fn blit(&self, request: &BlitRequest) -> Result<(), ChannelError>;
}

/// Channel used when no accelerator device could be opened.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChannel;

impl BlitChannel for NullChannel {
    fn blit(&self, _request: &BlitRequest) -> Result<(), ChannelError> {
        Err(ChannelError::Unavailable)
    }
}

/// Well-known device node for the bit-blit engine.
#[cfg(unix)]
pub const DEFAULT_DEVICE_PATH: &str = "/dev/bitblt";

#[cfg(unix)]
mod device {
    use std::fs::{File, OpenOptions};
    use std::os::fd::AsRawFd;
    use std::path::Path;

    use super::{BlitChannel, BlitRequest, ChannelError};

    /// Wire layout of one copy request as the device consumes it.
    #[repr(C)]
    struct RawBlitArgs {
        dst_dma_buf: libc::c_int,
        dst_offset: u64,
        dst_stride: u32,
        src_dma_buf: libc::c_int,
        src_offset: u64,
        src_stride: u32,
        columns: u32,
        rows: u32,
    }

    const IOC_WRITE: libc::c_ulong = 1;

    const fn ioc(dir: libc::c_ulong, ty: u8, nr: u8, size: usize) -> libc::c_ulong {
        (dir << 30) | ((size as libc::c_ulong) << 16) | ((ty as libc::c_ulong) << 8) | nr as libc::c_ulong
    }

    const BLIT_IOC_COPY: libc::c_ulong =
        ioc(IOC_WRITE, b'b', 0x01, std::mem::size_of::<RawBlitArgs>());

    /// Accelerator channel backed by the kernel bit-blit device node.
    ///
    /// Opened once at compositor construction; the fd is held for the
    /// channel's lifetime and closed on drop. The copy ioctl blocks until
    /// the transfer is complete, so a successful return means the pixels
    /// have landed.
    #[derive(Debug)]
    pub struct DeviceChannel {
        device: File,
    }

    impl DeviceChannel {
        /// Open the device node read-write.
        pub fn open(path: impl AsRef<Path>) -> Result<Self, ChannelError> {
            let device = OpenOptions::new().read(true).write(true).open(path)?;
            Ok(Self { device })
        }
    }

    impl BlitChannel for DeviceChannel {
        fn blit(&self, request: &BlitRequest) -> Result<(), ChannelError> {
            let args = RawBlitArgs {
                dst_dma_buf: request.dst.0,
                dst_offset: request.dst_offset,
                dst_stride: request.dst_stride,
                src_dma_buf: request.src.0,
                src_offset: request.src_offset,
                src_stride: request.src_stride,
                columns: request.columns,
                rows: request.rows,
            };
            // The driver reads `args` before the call returns; the fd stays
            // open for `self`'s lifetime.
            #[allow(unsafe_code)]
            let status = unsafe { libc::ioctl(self.device.as_raw_fd(), BLIT_IOC_COPY, &args) };
            if status != 0 {
                return Err(ChannelError::Device { status });
            }
            Ok(())
        }
    }
}

#[cfg(unix)]
pub use device::DeviceChannel;
