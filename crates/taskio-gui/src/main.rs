mod app;
mod dom;
mod http;
mod views;

use taskio_core::AppConfig;

const EMBEDDED_CONFIG: &str =
  include_str!("../taskio.toml");

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting Taskio frontend"
  );

  dom::by_id(dom::APP_ROOT_ID).expect(
    "missing #app mount element"
  );

  let config = match taskio_core::load_config(
    EMBEDDED_CONFIG,
    dom::meta_overrides()
  ) {
    | Ok(config) => config,
    | Err(error) => {
      tracing::error!(
        error = %format!("{error:#}"),
        "invalid configuration, using defaults"
      );
      AppConfig::default()
    }
  };

  app::start(config);
}
