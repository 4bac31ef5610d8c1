use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    /// Missing or malformed configuration. Fatal at startup.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid violation pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Network or API failure while talking to the comment platform.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The platform answered but refused the action (already deleted, no permission, ...).
    #[error("Rejected by platform: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for WardenError {
    fn from(e: ureq::Error) -> Self {
        WardenError::Transport(e.to_string())
    }
}

/// Coarse classification used in cycle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Rejected,
    Other,
}

impl WardenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Rejected(_) => ErrorKind::Rejected,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
