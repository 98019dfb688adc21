use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  warn
};

#[derive(
  Debug, Clone, Deserialize, PartialEq,
)]
#[serde(default)]
pub struct AppConfig {
  pub api:   ApiConfig,
  pub views: ViewsConfig,
  pub ui:    UiConfig
}

#[derive(
  Debug, Clone, Deserialize, PartialEq,
)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String
}

#[derive(
  Debug, Clone, Deserialize, PartialEq,
)]
#[serde(default)]
pub struct ViewsConfig {
  pub base_path: String
}

#[derive(
  Debug, Clone, Deserialize, PartialEq,
)]
#[serde(default)]
pub struct UiConfig {
  pub app_name: String,
  pub timezone: String,
  pub toast_ms: u32
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      api:   ApiConfig::default(),
      views: ViewsConfig::default(),
      ui:    UiConfig::default()
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url:
        "http://localhost:3000/api"
          .to_string()
    }
  }
}

impl Default for ViewsConfig {
  fn default() -> Self {
    Self {
      base_path: "views".to_string()
    }
  }
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      app_name: "Taskio".to_string(),
      timezone: "UTC".to_string(),
      toast_ms: 3000
    }
  }
}

impl AppConfig {
  #[tracing::instrument(skip(text))]
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg: AppConfig =
      toml::from_str(text).context(
        "failed to parse taskio \
         configuration"
      )?;
    cfg.validate()?;
    debug!(
      api = %cfg.api.base_url,
      views = %cfg.views.base_path,
      "loaded configuration"
    );
    Ok(cfg)
  }

  /// Applies dotted `section.key`
  /// overrides on top of the loaded
  /// values.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      let value = value.trim().to_string();
      match key.trim() {
        | "api.base_url" => {
          self.api.base_url = value
        }
        | "views.base_path" => {
          self.views.base_path = value
        }
        | "ui.app_name" => {
          self.ui.app_name = value
        }
        | "ui.timezone" => {
          self.ui.timezone = value
        }
        | "ui.toast_ms" => {
          self.ui.toast_ms = value
            .parse()
            .with_context(|| {
              format!(
                "invalid ui.toast_ms \
                 override: {value}"
              )
            })?;
        }
        | other => {
          warn!(key = %other, "ignoring unknown configuration override");
        }
      }
    }
    self.validate()
  }

  /// Configured zone for due dates;
  /// falls back to UTC when the name
  /// is not a known IANA zone.
  pub fn timezone(&self) -> Tz {
    match self.ui.timezone.parse::<Tz>()
    {
      | Ok(tz) => tz,
      | Err(error) => {
        warn!(
          timezone = %self.ui.timezone,
          %error,
          "unknown timezone; using UTC"
        );
        chrono_tz::UTC
      }
    }
  }

  /// Endpoint URL under the API base.
  pub fn api_url(
    &self,
    path: &str
  ) -> String {
    format!(
      "{}/{}",
      self.api.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  fn validate(
    &self
  ) -> anyhow::Result<()> {
    if self.api.base_url.trim().is_empty()
    {
      return Err(anyhow!(
        "api.base_url cannot be empty"
      ));
    }
    if self.ui.toast_ms == 0 {
      return Err(anyhow!(
        "ui.toast_ms must be positive"
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::AppConfig;

  #[test]
  fn missing_sections_use_defaults() {
    let cfg = AppConfig::from_toml_str(
      "[ui]\ntimezone = \
       \"America/Bogota\"\n"
    )
    .expect("parse config");
    assert_eq!(
      cfg.api.base_url,
      "http://localhost:3000/api"
    );
    assert_eq!(cfg.ui.toast_ms, 3000);
    assert_eq!(
      cfg.timezone(),
      chrono_tz::America::Bogota
    );
  }

  #[test]
  fn overrides_replace_dotted_keys() {
    let mut cfg = AppConfig::default();
    cfg
      .apply_overrides(vec![
        (
          "api.base_url".to_string(),
          "https://api.example.com/"
            .to_string()
        ),
        (
          "ui.toast_ms".to_string(),
          "1500".to_string()
        ),
      ])
      .expect("apply overrides");
    assert_eq!(
      cfg.api_url("/tasks"),
      "https://api.example.com/tasks"
    );
    assert_eq!(cfg.ui.toast_ms, 1500);
  }

  #[test]
  fn rejects_empty_api_base() {
    let err = AppConfig::from_toml_str(
      "[api]\nbase_url = \"\"\n"
    )
    .expect_err("empty base url");
    assert!(
      err.to_string().contains("api")
    );
  }

  #[test]
  fn unknown_timezone_falls_back_to_utc()
  {
    let mut cfg = AppConfig::default();
    cfg.ui.timezone =
      "Mars/Olympus".to_string();
    assert_eq!(
      cfg.timezone(),
      chrono_tz::UTC
    );
  }
}
