//! Arx Telemetry - `tracing` subscriber setup for the Arx tools.
//!
//! This crate provides:
//! - [`LogConfig`] with level, format, target (stderr, stdout or rolling
//!   file) and per-target directives
//! - [`setup_logging`] to install a global subscriber from that config
//! - [`build_subscriber`] for scoped subscribers (tests, embedding)
//!
//! # Example
//!
//! ```rust,no_run
//! use arx_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), arx_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("arx_crypto=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    ArxSubscriber, FileRotation, LogConfig, LogFormat, LogTarget, build_subscriber, setup_logging,
};
