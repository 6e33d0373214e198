use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sweeper_core::{CoreError, ErrorExt};

/// A [`CoreError`] rendered as the JSON failure envelope.
#[derive(Debug)]
pub struct ApiError {
    error: CoreError,
    context: Option<&'static str>,
}

impl ApiError {
    pub fn new(error: CoreError) -> Self {
        Self {
            error,
            context: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(CoreError::invalid_input(message))
    }

    /// Prefix shown in front of upstream and internal failure messages.
    pub fn context(mut self, context: &'static str) -> Self {
        self.context = Some(context);
        self
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.error)
    }

    pub fn message(&self) -> String {
        let message = self.error.user_friendly_message();
        match self.context {
            Some(context) if self.status().is_server_error() => {
                format!("{}: {}", context, message)
            }
            _ => message,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self::new(error)
    }
}

pub fn status_for(error: &CoreError) -> StatusCode {
    match error {
        CoreError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        CoreError::Auth(_) => StatusCode::UNAUTHORIZED,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::YouTubeApi(_) | CoreError::Network(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            self.error.log_error();
        } else {
            self.error.log_warn();
        }

        let body = Json(json!({
            "success": false,
            "message": self.message(),
            "code": self.error.detailed_code(),
        }));

        (status, body).into_response()
    }
}
