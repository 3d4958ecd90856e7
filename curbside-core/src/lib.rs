//! Core types, query handlers, and intent dispatch for the curbside pickup assistant.

/// Process configuration.
pub mod config;
/// Intent routing on top of the query handlers.
pub mod dispatch;
/// Domain models and the upstream event normalization.
pub mod model;
/// Traits describing the schedule provider interface.
pub mod ports;
/// Query handlers answering pickup questions.
pub mod service;

pub use config::*;
pub use dispatch::*;
pub use model::*;
pub use ports::*;
pub use service::*;
