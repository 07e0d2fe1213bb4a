//! Video assembly.
//!
//! Rendered chart frames are read back in year order, resized to the output resolution and pushed
//! into a [`sink::FrameSink`].

/// Frame directory scanning and the assembly loop.
pub mod assemble;
/// `ffmpeg`-based sink (system `ffmpeg` binary).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
