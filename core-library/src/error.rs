use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate track id: {0}")]
    Duplicate(String),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

impl From<LibraryError> for BridgeError {
    fn from(err: LibraryError) -> Self {
        BridgeError::OperationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
