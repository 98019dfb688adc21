//! Remote API seams. The browser crate implements these over HTTP with
//! cookie credentials; tests use in-memory fakes.

use async_trait::async_trait;
use taskio_gui_shared::{
    Credentials, LoginResponse, ProfilePatch, SessionDto, SignupRequest, TaskCreate, TaskDto,
    TaskId, TaskPatch, TaskStatsDto, TaskStatus, UserProfileDto,
};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated,
    Anonymous,
}

impl SessionStatus {
    /// Maps a `/session` response. A 2xx answer is a session unless the
    /// body says `authenticated: false`; 401 and 403 mean "no session";
    /// any other failure is an error the caller treats as anonymous.
    pub fn from_response(status: u16, body: Option<&SessionDto>) -> Result<Self, ApiError> {
        match status {
            200..=299 => Ok(match body {
                Some(SessionDto {
                    authenticated: Some(false),
                    ..
                }) => SessionStatus::Anonymous,
                _ => SessionStatus::Authenticated,
            }),
            401 | 403 => Ok(SessionStatus::Anonymous),
            status => Err(ApiError::Status {
                status,
                message: String::new(),
            }),
        }
    }
}

/// Server round-trip confirming whether the ambient credential is valid.
#[async_trait(?Send)]
pub trait SessionProbe {
    async fn probe(&self) -> Result<SessionStatus, ApiError>;
}

#[async_trait(?Send)]
pub trait TaskApi {
    async fn list(&self) -> Result<Vec<TaskDto>, ApiError>;
    async fn create(&self, task: &TaskCreate) -> Result<TaskDto, ApiError>;
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<TaskDto, ApiError>;
    async fn delete(&self, id: &TaskId) -> Result<(), ApiError>;
    async fn statistics(&self) -> Result<TaskStatsDto, ApiError>;

    async fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<TaskDto, ApiError> {
        self.update(id, &TaskPatch::status(status)).await
    }
}

#[async_trait(?Send)]
pub trait AuthApi {
    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError>;
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;
    async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError>;
}

#[async_trait(?Send)]
pub trait ProfileApi {
    async fn profile(&self) -> Result<UserProfileDto, ApiError>;
    async fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfileDto, ApiError>;
    async fn delete_account(&self, password: &str) -> Result<(), ApiError>;
}

/// REST paths relative to the configured API base.
pub mod endpoint {
    use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
    use taskio_gui_shared::TaskId;

    pub const TASKS: &str = "tasks";
    pub const TASK_STATISTICS: &str = "tasks/statistics";
    pub const SIGNUP: &str = "signup";
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const SESSION: &str = "session";
    pub const FORGOT_PASSWORD: &str = "forgot-password";
    pub const PROFILE: &str = "users/me";

    pub fn task(id: &TaskId) -> String {
        format!("{TASKS}/{}", utf8_percent_encode(id.as_str(), NON_ALPHANUMERIC))
    }

    pub fn reset_password(token: &str) -> String {
        format!("reset-password/{}", utf8_percent_encode(token, NON_ALPHANUMERIC))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_status_from_probe_response() {
        let signed_out = SessionDto {
            authenticated: Some(false),
            user_id: None,
        };
        assert_eq!(
            SessionStatus::from_response(200, None),
            Ok(SessionStatus::Authenticated)
        );
        assert_eq!(
            SessionStatus::from_response(200, Some(&signed_out)),
            Ok(SessionStatus::Anonymous)
        );
        assert_eq!(
            SessionStatus::from_response(401, None),
            Ok(SessionStatus::Anonymous)
        );
        assert!(SessionStatus::from_response(502, None).is_err());
    }

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(endpoint::task(&TaskId::from("65f0c1")), "tasks/65f0c1");
        assert_eq!(endpoint::reset_password("a/b c"), "reset-password/a%2Fb%20c");
    }
}
