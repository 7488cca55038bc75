//! Display-side bridge: framebuffer synchronization and the cursor-shape
//! cache.

pub mod cursor;
pub mod framebuffer;
