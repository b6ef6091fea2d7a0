//! Externally allocated display buffers: validated descriptors and the
//! bounds-checked view the software copy path goes through.

pub mod descriptor;
pub mod view;
