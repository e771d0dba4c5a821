//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is alive.
//!
//! # Tasks
//! - Cleanup: removes expired records and evicts low-value entries at
//!   configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
