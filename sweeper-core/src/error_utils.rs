use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Auth(e) => {
                error!("Authentication error details: {:?}", e);
            }
            CoreError::YouTubeApi(e) => {
                error!("YouTube API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Auth(e) => e.user_friendly_message(),
            CoreError::YouTubeApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => message.clone(),
            CoreError::NotFound { resource } => format!("Could not find: {}", resource),
            CoreError::Io(_) => {
                "Could not read or write local application files.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Auth(_) => "AUTH".to_string(),
            CoreError::YouTubeApi(_) => "YOUTUBE_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
        }
    }
}

impl CoreError {
    /// Code of the innermost error, e.g. `AUTH_REQUIRED` rather than `AUTH`.
    pub fn detailed_code(&self) -> String {
        match self {
            CoreError::Auth(e) => e.error_code(),
            CoreError::YouTubeApi(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            other => other.error_code(),
        }
    }
}

impl ErrorExt for AuthError {
    fn log_error(&self) -> &Self {
        error!("AuthError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("AuthError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            AuthError::NotAuthenticated => "Authentication required".to_string(),
            AuthError::ExchangeFailed { .. } => {
                "Failed to authenticate. Please sign in again.".to_string()
            }
            AuthError::RefreshFailed { .. } | AuthError::MissingRefreshToken => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::InvalidToken => {
                "YouTube authentication token is invalid. Please re-authenticate.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            AuthError::NotAuthenticated => "AUTH_REQUIRED".to_string(),
            AuthError::ExchangeFailed { .. } => "AUTH_EXCHANGE_FAILED".to_string(),
            AuthError::RefreshFailed { .. } => "AUTH_REFRESH_FAILED".to_string(),
            AuthError::MissingRefreshToken => "AUTH_NO_REFRESH_TOKEN".to_string(),
            AuthError::InvalidToken => "AUTH_INVALID_TOKEN".to_string(),
        }
    }
}

impl ErrorExt for YouTubeApiError {
    fn log_error(&self) -> &Self {
        error!("YouTubeApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("YouTubeApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            YouTubeApiError::QuotaExceeded => {
                "YouTube API quota exceeded. Please try again tomorrow.".to_string()
            }
            YouTubeApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to moderate this content.",
                resource
            ),
            YouTubeApiError::NotFound { resource } => format!("Could not find: {}", resource),
            YouTubeApiError::RequestTimeout => {
                "Request to YouTube timed out. Please try again.".to_string()
            }
            _ => "YouTube API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            YouTubeApiError::QuotaExceeded => "YOUTUBE_QUOTA_EXCEEDED".to_string(),
            YouTubeApiError::Forbidden { .. } => "YOUTUBE_FORBIDDEN".to_string(),
            YouTubeApiError::NotFound { .. } => "YOUTUBE_NOT_FOUND".to_string(),
            YouTubeApiError::ServerError { .. } => "YOUTUBE_SERVER_ERROR".to_string(),
            YouTubeApiError::RequestFailed { .. } => "YOUTUBE_REQUEST_FAILED".to_string(),
            YouTubeApiError::RequestTimeout => "YOUTUBE_TIMEOUT".to_string(),
            YouTubeApiError::InvalidResponse { .. } => "YOUTUBE_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidFormat { .. } => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file could not be parsed. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
