use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallviewError {
    #[error("camera capture failed: {0}")]
    Capture(String),
    #[error("invalid screen bounds: {0}")]
    InvalidBounds(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
