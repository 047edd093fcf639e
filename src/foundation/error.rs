/// Crate-wide result alias.
pub type StackshowResult<T> = Result<T, StackshowError>;

/// Error taxonomy for scene construction, timeline compilation, rendering and
/// encoding.
///
/// All scene inputs are literals baked into the directors, so most variants
/// indicate caller defects rather than recoverable conditions; they propagate
/// unhandled and are fatal to the run.
#[derive(thiserror::Error, Debug)]
pub enum StackshowError {
    /// Invalid construction input (bad range, bad color, out-of-range cell).
    #[error("validation error: {0}")]
    Validation(String),

    /// Inconsistent scene/timeline state (duplicate entrance, unknown id).
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Rasterization failure (fonts, pixmap limits).
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink / ffmpeg failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped external error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackshowError {
    /// Build a [`StackshowError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StackshowError::Timeline`].
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`StackshowError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StackshowError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StackshowError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            StackshowError::timeline("x")
                .to_string()
                .contains("timeline error:")
        );
        assert!(
            StackshowError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            StackshowError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StackshowError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
