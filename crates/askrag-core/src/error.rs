use thiserror::Error;

/// Failure kinds of the ingestion and query pipelines. Public engine
/// operations absorb every kind and return a neutral value; the kind
/// exists so internal callers and tests can tell failures apart.
#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No content extracted: {0}")]
    EmptyExtraction(String),

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn index<E: std::fmt::Display>(cause: E) -> Self {
        Self::IndexUnavailable(cause.to_string())
    }

    pub fn generation<E: std::fmt::Display>(cause: E) -> Self {
        Self::Generation(cause.to_string())
    }
}
