//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit tracing events
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stderr
//! ```
//!
//! stdout is reserved for task output.

pub mod logging;

pub use logging::init_logging;
