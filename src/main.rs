use vega_admin::config::{default_webview_data_dir, AppConfig};
use vega_admin::logging;

mod app;
mod ui;

use app::{App, APP_CONFIG};

fn main() {
    let config = AppConfig::load();
    let log_filter = config
        .as_ref()
        .map(|config| config.log_filter.clone())
        .unwrap_or_else(|_| "info".to_string());
    logging::init(&log_filter);

    let config = config.unwrap_or_else(|err| {
        tracing::error!("failed to load config, using defaults: {err:#}");
        AppConfig::default()
    });
    tracing::info!(api = %config.api_base_url, "starting vega-admin");
    let _ = APP_CONFIG.set(config);

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("VegaCity Admin"))
                .with_data_directory(webview_data_dir),
        )
        .launch(App);
}
