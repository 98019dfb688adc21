use async_trait::async_trait;
use gloo::net::http::{
  Request,
  RequestBuilder
};
use serde::de::DeserializeOwned;
use taskio_core::AppConfig;
use taskio_core::api::{
  AuthApi,
  ProfileApi,
  SessionProbe,
  SessionStatus,
  TaskApi,
  endpoint
};
use taskio_core::error::{
  ApiError,
  FetchError
};
use taskio_core::view::{
  FragmentSource,
  fragment_path
};
use taskio_gui_shared::{
  ApiMessage,
  Credentials,
  DeleteAccountRequest,
  ForgotPasswordRequest,
  LoginResponse,
  ProfilePatch,
  ResetPasswordRequest,
  SessionDto,
  SignupRequest,
  TaskCreate,
  TaskDto,
  TaskId,
  TaskPatch,
  TaskStatsDto,
  UserProfileDto
};
use tracing::{
  debug,
  warn
};
use web_sys::RequestCredentials;

/// REST client for the task API plus
/// the same-origin fragment loader.
pub struct HttpClient {
  config: AppConfig
}

impl HttpClient {
  pub fn new(config: AppConfig) -> Self {
    Self {
      config
    }
  }

  fn url(&self, path: &str) -> String {
    self.config.api_url(path)
  }

  /// Every API call carries the session
  /// cookie.
  fn with_session(
    builder: RequestBuilder
  ) -> RequestBuilder {
    builder.credentials(
      RequestCredentials::Include
    )
  }

  #[tracing::instrument(skip(
    self, request
  ))]
  async fn exchange(
    &self,
    path: &str,
    request: Result<
      Request,
      gloo::net::Error
    >
  ) -> Result<String, ApiError> {
    let request = request.map_err(|e| {
      ApiError::Network(format!(
        "failed to build request: {e}"
      ))
    })?;
    let response =
      request.send().await.map_err(
        |e| ApiError::Network(e.to_string())
      )?;
    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| {
        ApiError::Network(e.to_string())
      })?;

    if !response.ok() {
      let message =
        serde_json::from_str::<ApiMessage>(
          &text
        )
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_default();
      warn!(status, %message, "api request rejected");
      return Err(ApiError::Status {
        status,
        message
      });
    }

    debug!(
      status,
      bytes = text.len(),
      "api request completed"
    );
    Ok(text)
  }

  async fn fetch_json<T>(
    &self,
    path: &str,
    request: Result<
      Request,
      gloo::net::Error
    >
  ) -> Result<T, ApiError>
  where
    T: DeserializeOwned
  {
    let text =
      self.exchange(path, request).await?;
    serde_json::from_str(&text).map_err(
      |e| ApiError::Decode(e.to_string())
    )
  }

  async fn fetch_unit(
    &self,
    path: &str,
    request: Result<
      Request,
      gloo::net::Error
    >
  ) -> Result<(), ApiError> {
    self.exchange(path, request).await?;
    Ok(())
  }
}

#[async_trait(?Send)]
impl SessionProbe for HttpClient {
  #[tracing::instrument(skip(self))]
  async fn probe(
    &self
  ) -> Result<SessionStatus, ApiError> {
    let response = Self::with_session(
      Request::get(
        &self.url(endpoint::SESSION)
      )
    )
    .send()
    .await
    .map_err(|e| {
      ApiError::Network(e.to_string())
    })?;
    let status = response.status();
    let body = response
      .text()
      .await
      .ok()
      .and_then(|text| {
        serde_json::from_str::<SessionDto>(
          &text
        )
        .ok()
      });
    SessionStatus::from_response(
      status,
      body.as_ref()
    )
  }
}

#[async_trait(?Send)]
impl TaskApi for HttpClient {
  async fn list(
    &self
  ) -> Result<Vec<TaskDto>, ApiError> {
    self
      .fetch_json(
        endpoint::TASKS,
        Self::with_session(Request::get(
          &self.url(endpoint::TASKS)
        ))
        .build()
      )
      .await
  }

  async fn create(
    &self,
    task: &TaskCreate
  ) -> Result<TaskDto, ApiError> {
    self
      .fetch_json(
        endpoint::TASKS,
        Self::with_session(Request::post(
          &self.url(endpoint::TASKS)
        ))
        .json(task)
      )
      .await
  }

  async fn update(
    &self,
    id: &TaskId,
    patch: &TaskPatch
  ) -> Result<TaskDto, ApiError> {
    let path = endpoint::task(id);
    self
      .fetch_json(
        &path,
        Self::with_session(Request::put(
          &self.url(&path)
        ))
        .json(patch)
      )
      .await
  }

  async fn delete(
    &self,
    id: &TaskId
  ) -> Result<(), ApiError> {
    let path = endpoint::task(id);
    self
      .fetch_unit(
        &path,
        Self::with_session(
          Request::delete(&self.url(&path))
        )
        .build()
      )
      .await
  }

  async fn statistics(
    &self
  ) -> Result<TaskStatsDto, ApiError> {
    self
      .fetch_json(
        endpoint::TASK_STATISTICS,
        Self::with_session(Request::get(
          &self.url(
            endpoint::TASK_STATISTICS
          )
        ))
        .build()
      )
      .await
  }
}

#[async_trait(?Send)]
impl AuthApi for HttpClient {
  async fn signup(
    &self,
    request: &SignupRequest
  ) -> Result<(), ApiError> {
    self
      .fetch_unit(
        endpoint::SIGNUP,
        Self::with_session(Request::post(
          &self.url(endpoint::SIGNUP)
        ))
        .json(request)
      )
      .await
  }

  async fn login(
    &self,
    credentials: &Credentials
  ) -> Result<LoginResponse, ApiError> {
    self
      .fetch_json(
        endpoint::LOGIN,
        Self::with_session(Request::post(
          &self.url(endpoint::LOGIN)
        ))
        .json(credentials)
      )
      .await
  }

  async fn logout(
    &self
  ) -> Result<(), ApiError> {
    self
      .fetch_unit(
        endpoint::LOGOUT,
        Self::with_session(Request::post(
          &self.url(endpoint::LOGOUT)
        ))
        .build()
      )
      .await
  }

  async fn forgot_password(
    &self,
    email: &str
  ) -> Result<(), ApiError> {
    let body = ForgotPasswordRequest {
      email: email.to_string()
    };
    self
      .fetch_unit(
        endpoint::FORGOT_PASSWORD,
        Self::with_session(Request::post(
          &self.url(
            endpoint::FORGOT_PASSWORD
          )
        ))
        .json(&body)
      )
      .await
  }

  async fn reset_password(
    &self,
    token: &str,
    password: &str
  ) -> Result<(), ApiError> {
    let path =
      endpoint::reset_password(token);
    let body = ResetPasswordRequest {
      password: password.to_string()
    };
    self
      .fetch_unit(
        "reset-password",
        Self::with_session(Request::post(
          &self.url(&path)
        ))
        .json(&body)
      )
      .await
  }
}

#[async_trait(?Send)]
impl ProfileApi for HttpClient {
  async fn profile(
    &self
  ) -> Result<UserProfileDto, ApiError> {
    self
      .fetch_json(
        endpoint::PROFILE,
        Self::with_session(Request::get(
          &self.url(endpoint::PROFILE)
        ))
        .build()
      )
      .await
  }

  async fn update_profile(
    &self,
    patch: &ProfilePatch
  ) -> Result<UserProfileDto, ApiError> {
    self
      .fetch_json(
        endpoint::PROFILE,
        Self::with_session(Request::put(
          &self.url(endpoint::PROFILE)
        ))
        .json(patch)
      )
      .await
  }

  async fn delete_account(
    &self,
    password: &str
  ) -> Result<(), ApiError> {
    let body = DeleteAccountRequest {
      password: password.to_string()
    };
    self
      .fetch_unit(
        endpoint::PROFILE,
        Self::with_session(
          Request::delete(
            &self.url(endpoint::PROFILE)
          )
        )
        .json(&body)
      )
      .await
  }
}

#[async_trait(?Send)]
impl FragmentSource for HttpClient {
  #[tracing::instrument(skip(self))]
  async fn fetch(
    &self,
    name: &str
  ) -> Result<String, FetchError> {
    let url = fragment_path(
      &self.config.views.base_path,
      name
    );
    let response = Request::get(&url)
      .send()
      .await
      .map_err(|e| FetchError::Network {
        name:    name.to_string(),
        message: e.to_string()
      })?;

    if !response.ok() {
      return Err(FetchError::NotFound {
        name:   name.to_string(),
        status: response.status()
      });
    }

    response.text().await.map_err(|e| {
      FetchError::Network {
        name:    name.to_string(),
        message: e.to_string()
      }
    })
  }
}
