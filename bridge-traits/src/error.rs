use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Queue position {position} out of range (queue length {len})")]
    InvalidPosition { position: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
