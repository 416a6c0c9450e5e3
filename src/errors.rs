use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access macro log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse macro log: {0}")]
    Csv(#[from] csv::Error),

    #[error("macro log header must be Date,Protein,Carbs,Fat (found {found:?})")]
    MalformedHeader { found: Vec<String> },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV export: {0}")]
    Flush(String),

    #[error("failed to render PDF export: {0}")]
    Pdf(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_IMPLEMENTED,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!("macro log failure: {err}");
        Self::internal(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        tracing::error!("export failure: {err}");
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
