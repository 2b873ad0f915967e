use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("No numeric features available for table {0}")]
    NoNumericFeatures(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("General error: {0}")]
    Other(String),
}

impl Error {
    /// HTTP status code for this error category.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidIdentifier(_) => 400,
            Error::UnknownTable(_) => 404,
            Error::NoNumericFeatures(_) => 422,
            _ => 500,
        }
    }

    /// Short category name, stable across releases.
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidIdentifier(_) => "invalid_identifier",
            Error::UnknownTable(_) => "unknown_table",
            Error::QueryFailed(_) => "query_failed",
            Error::NoNumericFeatures(_) => "no_numeric_features",
            Error::Config(_) => "configuration",
            Error::IO(_) => "io",
            Error::Json(_) => "serialization",
            Error::Csv(_) => "serialization",
            Error::Other(_) => "internal",
        }
    }

    /// Message that is safe to show to a user. Store and environment details are
    /// replaced by a summary; the full error is only ever logged.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidIdentifier(name) => format!(
                "Invalid table or column name '{}': only letters, digits and underscores are allowed",
                name
            ),
            Error::UnknownTable(name) => format!("Table '{}' does not exist", name),
            Error::NoNumericFeatures(name) => {
                format!("No numeric columns found for clustering in '{}'", name)
            }
            Error::QueryFailed(_) => "The data store could not complete the request".to_string(),
            Error::Config(_) => "The service is misconfigured".to_string(),
            Error::IO(_) | Error::Json(_) | Error::Csv(_) | Error::Other(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<mysql_async::Error> for Error {
    fn from(err: mysql_async::Error) -> Self {
        Error::QueryFailed(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}
