/// Convenience result type used across panorec.
pub type PanoResult<T> = Result<T, PanoError>;

/// Top-level error taxonomy.
///
/// Configuration anomalies are never reported through this type: they are clamped when the
/// geometry is derived. Existing output files are a skip policy, not an error. What remains are
/// failures that end the current capture run.
#[derive(thiserror::Error, Debug)]
pub enum PanoError {
    /// Invalid user-provided data that cannot be clamped into something usable.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external renderer failed to produce a face.
    #[error("render error: {0}")]
    Render(String),

    /// The output frame could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PanoError {
    /// Build a [`PanoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PanoError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PanoError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
