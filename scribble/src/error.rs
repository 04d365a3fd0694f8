use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribbleError {
    #[error("Missing collection: no place to save the record")]
    MissingCollection,

    #[error("Missing resource: unable to save a record without a name")]
    MissingResource,

    #[error("Record not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScribbleError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScribbleError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScribbleError>;
