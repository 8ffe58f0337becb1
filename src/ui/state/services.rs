use std::sync::Arc;

use anyhow::Result;

use vega_admin::config::AppConfig;
use vega_admin::infra::http::client::ApiClient;
use vega_admin::infra::session::static_token::StaticSession;

/// Collaborators shared by every list view, provided as root context.
#[derive(Clone)]
pub struct AppServices {
    pub config: AppConfig,
    pub session: Arc<StaticSession>,
    pub api: ApiClient,
}

impl AppServices {
    pub fn new(config: AppConfig) -> Result<Self> {
        let session = Arc::new(StaticSession::new(config.api_token.clone()));
        let api = ApiClient::new(
            &config.api_base_url,
            config.request_timeout(),
            session.clone(),
        )?;
        Ok(Self {
            config,
            session,
            api,
        })
    }
}
