//! HTTP mapping for service errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::Error;

/// Wrapper turning [`Error`] into an explicit `{ error, kind }` payload.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::MalformedRequest(_)
            | Error::EmbeddingUnavailable(_)
            | Error::RetrievalFailure(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::ConfigurationMissing(_) | Error::Config(_) | Error::Api(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Execution failures are counted by the engine; rejections are counted here
        if matches!(self.0, Error::MalformedRequest(_) | Error::RateLimited(_)) {
            metrics::counter!("search_errors_total", "kind" => self.0.kind()).increment(1);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::MalformedRequest("x".into()), StatusCode::BAD_REQUEST),
            (Error::EmbeddingUnavailable("x".into()), StatusCode::BAD_REQUEST),
            (Error::RetrievalFailure("x".into()), StatusCode::BAD_REQUEST),
            (Error::RateLimited("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (
                Error::ConfigurationMissing("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
