use thiserror::Error;

/// Every failure a run can hit. All of them are terminal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("failed to initialize client: {0}")]
    ClientConstruction(String),

    #[error("failed to get metadata: {0}")]
    MetadataFetch(String),

    #[error("failed to marshal metadata info: {0}")]
    MetadataEncode(#[from] serde_json::Error),

    #[error("failed to get object: {0}")]
    ObjectFetch(String),

    #[error("failed to read object data: {0}")]
    StreamCopy(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
