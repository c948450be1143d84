//! Pre-render handling of generated scene source: validation and naming.

/// Scene identifier extraction, uniquification and rewriting.
pub mod naming;
/// Static pre-flight checks on scene source.
pub mod validate;
