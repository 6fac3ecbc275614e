use crate::errors::BookingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// HTTP-facing wrapper over the engine's error taxonomy.
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::SessionNotFound(_) | BookingError::RoomNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            BookingError::SessionStateViolation { .. } => StatusCode::CONFLICT,
            BookingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BookingError::HardResolutionFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::LaunchFailed(_)
            | BookingError::BrowserNotLaunched
            | BookingError::TabCreationFailed(_)
            | BookingError::NoActiveTab
            | BookingError::NavigationFailed(_)
            | BookingError::JavaScriptFailed(_)
            | BookingError::ScreenshotFailed(_)
            | BookingError::ResourceFailure(_)
            | BookingError::TimeoutError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let mut body = json!({
            "success": false,
            "error": self.0.to_string(),
        });
        if let BookingError::HardResolutionFailure {
            stage, attempted, ..
        } = &self.0
        {
            body["stage"] = json!(stage);
            body["attempted"] = json!(attempted);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_violation_maps_to_conflict() {
        let err = ApiError(BookingError::SessionStateViolation {
            expected: "payment".into(),
            actual: "search".into(),
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_session_maps_to_not_found() {
        assert_eq!(
            ApiError(BookingError::SessionNotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn resolution_failure_maps_to_unprocessable() {
        let err = ApiError(BookingError::HardResolutionFailure {
            stage: "room-selection".into(),
            intent: "book button".into(),
            attempted: vec![],
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn browser_trouble_maps_to_bad_gateway() {
        assert_eq!(
            ApiError(BookingError::NavigationFailed("net::ERR".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
