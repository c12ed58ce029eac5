use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use expertsearch_common::SearchError;
use serde::Serialize;

/// HTTP-facing wrapper around [`SearchError`]
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub SearchError);

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: ErrorDetail {
                code: self.0.code(),
                message: self.0.to_string(),
                retryable: self.0.is_retryable(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(SearchError::EmptyQuery).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(SearchError::embedding_unavailable("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError(SearchError::storage("locked")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
