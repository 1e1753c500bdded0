use thiserror::Error;

#[derive(Error, Debug)]
pub enum AquaGuardError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} -> {status} {body}")]
    RemoteStatus {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl AquaGuardError {
    /// True for failures of the remote backend (transport or non-success status).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AquaGuardError::Http(_) | AquaGuardError::RemoteStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AquaGuardError>;
