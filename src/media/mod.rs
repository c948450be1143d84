//! Media inspection and audio/video muxing through the system `ffmpeg` tools.

/// `ffmpeg`-based audio/video muxing with duration reconciliation.
pub mod mux;
/// `ffprobe`-based duration measurement.
pub mod probe;
