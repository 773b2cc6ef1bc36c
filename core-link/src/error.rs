use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid link reference: {0}")]
    InvalidReference(String),

    #[error("Retraction incomplete: removed {removed} of {expected} entries: {source}")]
    RetractionIncomplete {
        removed: usize,
        expected: usize,
        #[source]
        source: BridgeError,
    },

    #[error("Splice incomplete: inserted {inserted} of {expected} tracks: {source}")]
    SpliceIncomplete {
        inserted: usize,
        expected: usize,
        #[source]
        source: BridgeError,
    },

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, LinkError>;
