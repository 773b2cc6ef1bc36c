use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Link error: {0}")]
    Link(#[from] core_link::LinkError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
