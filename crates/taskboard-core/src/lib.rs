//! taskboard-core library.
//!
//! Every operation here takes a task snapshot by reference and returns a new
//! value; nothing mutates the caller's data. The only stateful pieces are the
//! [`overdue::OverdueCache`] memo, the [`bus::EventBus`], and the
//! [`session::Session`] that owns both.

pub mod bus;
pub mod config;
pub mod error;
pub mod model;
pub mod outcome;
pub mod overdue;
pub mod report;
pub mod seed;
pub mod session;
pub mod timestamp;
pub mod transform;
pub mod validate;

// Conventions:
// - Errors: typed `thiserror` enums at module seams, `anyhow::Result` for
//   config loading and event handlers.
// - Logging: `tracing` macros (`info!`, `warn!`, `debug!`).

pub use error::ErrorCode;
pub use outcome::{Maybe, Outcome};
