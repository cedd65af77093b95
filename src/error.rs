use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Template endpoint returned status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Template endpoint returned no generations")]
    EmptyResponse,

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Output key '{key}' has no field mapping")]
    UnmappedKey { key: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedOutput(msg.into())
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
