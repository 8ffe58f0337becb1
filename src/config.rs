use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::page::DEFAULT_PAGE_SIZE;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub default_page_size: u32,
    /// Zero disables the transport timeout.
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            api_token: None,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Config file if present, then `VEGA_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = default_config_path()?;
        let mut config = Self::load_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config toml")
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("VEGA_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(token) = lookup("VEGA_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(size) = lookup("VEGA_PAGE_SIZE") {
            self.default_page_size = size
                .trim()
                .parse()
                .with_context(|| format!("VEGA_PAGE_SIZE is not a number: {size}"))?;
        }
        if let Some(filter) = lookup("VEGA_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url must not be empty")
        }
        if self.default_page_size == 0 {
            anyhow::bail!("default_page_size must be greater than zero")
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("vn", "vegacity", "vega-admin")
        .ok_or_else(|| anyhow!("unable to resolve application directories"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

/// Where CSV exports land unless the user picks another place.
pub fn default_export_dir() -> Result<PathBuf> {
    if let Some(download_dir) = directories::UserDirs::new()
        .as_ref()
        .and_then(|dirs| dirs.download_dir())
    {
        return Ok(download_dir.to_path_buf());
    }
    Ok(project_dirs()?.data_local_dir().to_path_buf())
}
