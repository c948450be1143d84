//! Driving the external renderer and finding what it produced.

/// Renderer subprocess invocation.
pub mod driver;
/// Quality-tier search for rendered artifacts.
pub mod locate;
