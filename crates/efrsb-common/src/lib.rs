//! EFRSB Monitor Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the EFRSB monitor workspace.
//!
//! # Overview
//!
//! This crate provides the pieces used across all workspace members:
//!
//! - **Error Handling**: the `EfrsbError` type and `Result` alias
//! - **Logging**: centralized tracing setup with env-based configuration
//!
//! # Example
//!
//! ```no_run
//! use efrsb_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{EfrsbError, Result};
