use thiserror::Error;

/// Failures of the content lookup collaborator.
///
/// A missing slug is not an error; lookups report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed catalog payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio playback is not available in this environment")]
    Unavailable,
    #[error("audio source failed to load: {0}")]
    Load(String),
    #[error("audio playback error: {0}")]
    Playback(String),
    #[error("audio release failed: {0}")]
    Release(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid presentation config: {0}")]
    Parse(#[from] serde_json::Error),
}
