use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("client session is not initialized")]
    NotInitialized,

    #[error("a client session is already open")]
    SessionAlreadyOpen,

    #[error("backend not reachable at {endpoint}: {reason}")]
    Connectivity { endpoint: String, reason: String },

    #[error("unknown object type: {type_tag}")]
    UnknownType { type_tag: String },

    #[error("no field '{name}' to fill route template '{template}'")]
    MissingField { name: String, template: String },

    #[error("request failed after {attempts} attempts: {source}")]
    Transient {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}")]
    BackendValidation { status: u16, message: String },

    #[error("failed to build client session: {reason}")]
    Session { reason: String },

    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, UploadError>;
