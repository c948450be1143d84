//! Age-based cleanup of rendered artifacts.

/// Best-effort sweep of the output tree.
pub mod sweep;
