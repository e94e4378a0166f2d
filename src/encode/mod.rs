//! Frame writers.
//!
//! Writers receive finished panoramas from the capture session, one file per output frame.

/// Frame writer trait and built-in writers.
pub mod sink;
