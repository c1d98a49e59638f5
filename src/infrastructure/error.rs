use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("backend error: http {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },
    #[error("invalid backend payload: {0}")]
    Payload(String),
    #[error("{0}")]
    Validation(String),
}

impl InfraError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
