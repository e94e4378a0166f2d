//! Capture settings and the geometry derived from them.

/// Capture configuration snapshot.
pub mod capture;
/// Output and face geometry derived from a configuration.
pub mod geometry;
