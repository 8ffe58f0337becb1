use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::entities::page::{PageRequest, PageResult};
use crate::domain::error::FetchError;
use crate::infra::http::client::{rejection_message, ApiClient};
use crate::infra::http::envelope::parse_page;
use crate::usecase::ports::source::PageSource;

/// Listing endpoint of one entity.
pub struct HttpPageSource<T> {
    api: ApiClient,
    endpoint: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    pub fn new(api: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
            _item: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl<T: DeserializeOwned + 'static> PageSource<T> for HttpPageSource<T> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>, FetchError> {
        let url = self.api.list_url(&self.endpoint, request)?;
        tracing::debug!(%url, "GET listing");

        let response = self.api.get(url).send().await?;
        let status = response.status();
        self.api.observe_status(status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::ServerRejected {
                status_code: status.as_u16(),
                message: rejection_message(&body),
            });
        }
        parse_page(&body, request)
    }
}
