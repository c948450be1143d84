//! Cross-cutting building blocks: errors, configuration and the external-process boundary.

/// Pipeline configuration.
pub mod config;
/// Error taxonomy.
pub mod error;
/// Child-process execution with timeouts and captured output.
pub mod process;
