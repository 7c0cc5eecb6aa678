use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::negotiate::NegotiationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Negotiation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Negotiation(NegotiationError::MalformedMediaType(_)) => "MALFORMED_ACCEPT",
            ApiError::Negotiation(NegotiationError::Cycle { .. }) => "NEGOTIATION_CYCLE",
            ApiError::Negotiation(NegotiationError::MissingConverter { .. }) => {
                "MISSING_CONVERTER"
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediatype::MediaTypeError;

    #[test]
    fn test_error_codes() {
        let err = ApiError::from(NegotiationError::from(MediaTypeError::Malformed(
            "nonsense".to_string(),
        )));
        assert_eq!(err.code(), "MALFORMED_ACCEPT");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("nonsense"));
    }
}
