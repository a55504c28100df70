use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillError>;

/// Error taxonomy for the skill backend.
#[derive(Error, Debug)]
pub enum SkillError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("stats server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    #[error("unexpected payload from {path}: {source}")]
    Payload {
        path: &'static str,
        source: serde_json::Error,
    },

    #[error("unrecognized intent '{0}'")]
    UnknownIntent(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SkillError {
    /// Fetch-class failures. These never reach the user as speech: the
    /// turn is logged and dropped (or answered with the configured
    /// fallback line), never spoken partially.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Json { .. } | Self::Payload { .. }
        )
    }
}
