//! Handle registration, content verification, and sentiment-gated submission review.

pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
