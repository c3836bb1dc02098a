use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("No title or content could be extracted from {url}")]
    EmptyContent { url: String },

    #[error("Article {0} not found")]
    NotFound(i64),

    #[error("Persistence error: {0}")]
    Persistence(#[from] tokio_rusqlite::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit status reported by the binary for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) => 2,
            AppError::NotFound(_) => 3,
            AppError::Fetch(_) => 4,
            AppError::EmptyContent { .. } => 5,
            AppError::Persistence(_) | AppError::Database(_) => 6,
            AppError::Config(_) | AppError::Io(_) | AppError::Toml(_) | AppError::Json(_) => 1,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Fetch(format!("request timed out: {}", e))
        } else if e.is_connect() {
            AppError::Fetch(format!("host unreachable: {}", e))
        } else {
            AppError::Fetch(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
