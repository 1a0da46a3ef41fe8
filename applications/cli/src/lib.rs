//! Lectern CLI Library
//!
//! Configuration, session wiring and text output for the `lectern` binary.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod error;
pub mod listen;
pub mod report;
pub mod session;

// Re-export commonly used types for convenience
pub use config::LecternConfig;
pub use error::{CliError, Result};
pub use listen::{listen, ListenOptions};
pub use session::Session;
