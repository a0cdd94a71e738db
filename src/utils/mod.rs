//! Shared utilities: error types and logging setup.

pub mod error;
pub mod logging;

pub use error::{PpdaeError, Result};
pub use logging::{init_logging, EpochTimer, LogConfig, LogLevel};
