//! Queue message handling for the notification pipeline.
//!
//! Backend-agnostic pieces live at the crate root:
//! - [`MessageHandler`]: decode-and-handle contract for one queue
//! - [`ProcessingError`] / [`ErrorCategory`]: classification of handler failures
//! - [`Disposition`]: the broker action a classification maps to
//! - [`QueueDef`] / [`QueueConfig`]: durable queue names and consumer settings
//!
//! The `nats` feature adds the JetStream backend: durable pull consumers with explicit
//! acknowledgment, a persistent producer, and a per-queue worker loop.
//!
//! ```text
//!  publisher ──▶ stream (subject = queue) ──▶ durable consumer ──▶ QueueWorker
//!                                                                     │
//!                                     ack / term / nak ◀── Disposition ◀── MessageHandler
//! ```

mod error;
mod handler;
mod queue;

#[cfg(feature = "nats")]
pub mod nats;

pub use error::{Disposition, ErrorCategory, ProcessingError};
pub use handler::{dispatch, process_payload, MessageHandler};
pub use queue::{QueueConfig, QueueDef};
