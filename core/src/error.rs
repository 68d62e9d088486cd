use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// The artifact's schema tag (or one of its content categories) is not
    /// one this build understands. Fatal: results would be meaningless.
    #[error("incompatible index schema: found {found}, supported {supported}")]
    IncompatibleSchema { found: String, supported: String },

    #[error("unknown document: {0}")]
    UnknownDocument(String),

    #[error("duplicate document: {0}")]
    DuplicateDocument(String),

    #[error("malformed index: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
