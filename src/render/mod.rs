//! Built-in renderer.
//!
//! Hosts normally supply their own [`Camera`](crate::capture::camera::Camera). The procedural
//! camera stands in for one in the command-line tool and in tests.

/// Ray-cast procedural scene camera.
pub mod procedural;
