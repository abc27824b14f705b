use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Invalid(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(&'static str),
    #[error("import document is malformed: {0}")]
    ImportMalformed(String),
}

/// Why a single playback tier did not produce audio.
///
/// These never escape [`crate::MediaResolver::resolve`]; they only advance the
/// chain to the next tier and end up in the logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("timed out waiting for media to become playable")]
    Timeout,
    #[error("player error: {0}")]
    Player(String),
    #[error("speech synthesis is not supported on this platform")]
    SynthesisUnsupported,
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("superseded by a newer playback request")]
    Superseded,
}
