use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no exam data supplied")]
    NoExamData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not decode image '{label}': {reason}")]
    ImageDecode { label: String, reason: String },

    #[error("could not load asset '{label}': {reason}")]
    AssetLoad { label: String, reason: String },

    #[error("asset '{label}' timed out after {after:?}")]
    AssetTimeout { label: String, after: Duration },

    #[error("PDF backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Asset-level failures are recovered by the composer by falling back or
    /// skipping the image.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ImageDecode { .. } | Error::AssetLoad { .. } | Error::AssetTimeout { .. }
        )
    }
}
