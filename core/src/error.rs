use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A field was named for indexing or term generation without an analyzer.
    #[error("no analyzer registered for field `{field}`")]
    Configuration { field: String },
    #[error("invalid query construction: {0}")]
    Construction(&'static str),
    #[error("invalid analyzer configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error("invalid record at line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
