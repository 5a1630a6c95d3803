use buzz_http::HttpError;
use thiserror::Error;

/// Failures surfaced by every fetch in this crate.
///
/// Nothing is caught or retried internally: the first failing request ends the
/// call and its error reaches the caller unchanged.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// The HTML page did not carry the expected embedded payload.
    #[error("embedded payload `{marker}` not found in page ({page_len} bytes)")]
    Extraction { marker: String, page_len: usize },

    /// The body (or embedded payload) was not valid JSON.
    #[error("malformed JSON: {0}")]
    Decode(String),

    /// A caller-supplied value was rejected before any request was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Valid JSON, but an expected field was absent or had the wrong shape.
    #[error("schema mismatch at `{path}`: {reason}")]
    Schema { path: String, reason: String },
}

impl RealtimeError {
    pub(crate) fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RealtimeError>;
