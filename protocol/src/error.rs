use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Server rejected request (status {status:?}): {message:?}")]
    Rejected {
        status: Option<String>,
        message: Option<String>,
    },
}

impl ApiError {
    /// True when the server answered but did not report `status:"ok"`.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

pub type Result<T> = core::result::Result<T, ApiError>;
