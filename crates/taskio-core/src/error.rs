use thiserror::Error;

use crate::route::RouteName;

/// Failure reading a static view fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("fragment `{name}` not found (status {status})")]
    NotFound { name: String, status: u16 },
    #[error("network error loading fragment `{name}`: {message}")]
    Network { name: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text suitable for an inline message or toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Status { status, .. } => format!("The server answered with status {status}"),
            ApiError::Network(_) => "Could not reach the server".to_string(),
            ApiError::Decode(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must be between 1 and 50 characters")]
    TitleLength,
    #[error("detail must be at most 500 characters")]
    DetailLength,
    #[error("{0} is required")]
    Required(&'static str),
    #[error("invalid date or time")]
    InvalidDateTime,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error(
        "password needs at least 8 characters with a lowercase letter, \
         an uppercase letter and a special character"
    )]
    WeakPassword,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("age must be between 1 and 120")]
    InvalidAge,
    #[error("validation rules are unavailable")]
    RulesUnavailable,
}

/// The user-visible error taxonomy of the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("route not found: {0}")]
    RouteNotFound(String),
    #[error("failed to load view `{route}`: {source}")]
    FragmentLoadFailure {
        route: RouteName,
        #[source]
        source: FetchError,
    },
    #[error("authentication required for `{0}`")]
    AuthRequired(RouteName),
    #[error("`{0}` is only available without a session")]
    AuthForbidden(RouteName),
    #[error(transparent)]
    ApiRequestFailure(#[from] ApiError),
    #[error("validation failed: {}", join_messages(.0))]
    ValidationFailure(Vec<ValidationError>),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationFailure(vec![err])
    }
}

impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::ApiRequestFailure(err) => err.user_message(),
            AppError::ValidationFailure(errors) => join_messages(errors),
            other => other.to_string(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
