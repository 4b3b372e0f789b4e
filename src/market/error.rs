use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("User already exists")]
    DuplicateUser,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Listing not found")]
    ListingNotFound,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn status(&self) -> StatusCode {
        match self {
            MarketError::DuplicateUser => StatusCode::CONFLICT,
            MarketError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            MarketError::MissingFields => StatusCode::BAD_REQUEST,
            MarketError::ListingNotFound => StatusCode::NOT_FOUND,
            MarketError::Database(_) | MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
