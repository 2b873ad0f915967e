use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};
use crate::{Error, ErrorResponse};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Full detail stays in the log; clients get the category and a safe summary.
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.category(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidIdentifier("a b".into()), StatusCode::BAD_REQUEST),
            (Error::UnknownTable("staging_x".into()), StatusCode::NOT_FOUND),
            (Error::NoNumericFeatures("staging_x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::QueryFailed("syntax error near SELECT".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
