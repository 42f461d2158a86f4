pub type PloopResult<T> = Result<T, PloopError>;

#[derive(thiserror::Error, Debug)]
pub enum PloopError {
    /// Fatal before any frame work: bad arguments, unreadable input, no images,
    /// no usable font, sink failed to open.
    #[error("setup error: {0}")]
    Setup(String),

    /// One image failed to decode. Recoverable: the pipeline skips the image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Encoder spawn/write/finalize failure.
    #[error("encode error: {0}")]
    Encode(String),

    #[error("preview error: {0}")]
    Preview(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PloopError {
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn preview(msg: impl Into<String>) -> Self {
        Self::Preview(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(PloopError::setup("x").to_string().contains("setup error:"));
        assert!(PloopError::decode("x").to_string().contains("decode error:"));
        assert!(PloopError::encode("x").to_string().contains("encode error:"));
        assert!(
            PloopError::preview("x")
                .to_string()
                .contains("preview error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PloopError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
