use thiserror::Error;

/// Failure talking to the content backend or the border data source.
///
/// Never shown to the user: every call site converts it into a fallback and
/// logs it.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no API key configured (set [gemini] api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no usable content")]
    Empty,

    #[error("image payload could not be decoded: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for BackendError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response
                    .into_string()
                    .unwrap_or_default()
                    .chars()
                    .take(200)
                    .collect();
                BackendError::Status { status, body }
            }
            ureq::Error::Transport(t) => BackendError::Transport(t.to_string()),
        }
    }
}
