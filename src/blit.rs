//! Bit-blit execution: the accelerator channel abstraction and the merge
//! engine with its software fallback.

pub mod channel;
pub mod engine;
