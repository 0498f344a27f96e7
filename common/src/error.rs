use derive_more::Display;

/// Shown when the backend gives no diagnostic of its own.
pub const FALLBACK_MESSAGE: &str = "Ошибка";

#[derive(Debug, Display)]
pub enum ServiceError {
    /// The round trip did not complete, or a read returned a non-success status.
    #[display(fmt = "Transport error: {}", _0)]
    Transport(anyhow::Error),
    /// The backend answered an upload with a non-success status.
    #[display(fmt = "Server rejected request with status {}", code)]
    Rejected { code: u16, detail: Option<String> },
    /// Failure on the client side, before or after the network call.
    #[display(fmt = "{}", _0)]
    Local(anyhow::Error),
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        ServiceError::Transport(err.into())
    }

    pub fn local(err: impl Into<anyhow::Error>) -> Self {
        ServiceError::Local(err.into())
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            ServiceError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Diagnostic from the backend if it sent one, verbatim.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ServiceError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        self.detail().unwrap_or(FALLBACK_MESSAGE).to_string()
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> ServiceError {
        ServiceError::Transport(err.into())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> ServiceError {
        ServiceError::Local(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
