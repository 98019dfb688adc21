pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod home;
pub mod layout;
pub mod modal;
pub mod notify;
pub mod profile;
pub mod render;
pub mod route;
pub mod router;
pub mod task_form;
pub mod view;

pub use config::AppConfig;
pub use error::{
  ApiError,
  AppError,
  FetchError,
  ValidationError
};
pub use route::{
  RouteName,
  RouteTable
};
pub use router::{
  Navigation,
  Router,
  RouterParts
};

use tracing::{
  debug,
  info
};

/// Builds the runtime configuration from
/// the embedded TOML document and any
/// host-supplied `section.key` overrides.
#[tracing::instrument(skip_all)]
pub fn load_config<I>(
  embedded: &str,
  overrides: I
) -> anyhow::Result<AppConfig>
where
  I: IntoIterator<
    Item = (String, String)
  >
{
  let mut cfg =
    AppConfig::from_toml_str(embedded)?;
  let overrides: Vec<(String, String)> =
    overrides.into_iter().collect();
  debug!(
    count = overrides.len(),
    "collected configuration overrides"
  );
  cfg.apply_overrides(overrides)?;

  info!(
    api = %cfg.api.base_url,
    timezone = %cfg.timezone(),
    "taskio configuration ready"
  );
  Ok(cfg)
}
