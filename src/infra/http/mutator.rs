use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde_json::Value;

use crate::domain::error::MutationError;
use crate::infra::http::client::{rejection_message, ApiClient};
use crate::usecase::ports::mutator::RecordMutator;

/// Write side of one entity endpoint: `POST {endpoint}`, `PATCH` and
/// `DELETE {endpoint}/{id}`.
pub struct HttpRecordMutator {
    api: ApiClient,
    endpoint: String,
}

impl HttpRecordMutator {
    pub fn new(api: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, id: Option<&str>) -> Result<Url, MutationError> {
        Ok(self.api.resource_url(&self.endpoint, id)?)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(), MutationError> {
        let response = builder.send().await?;
        let status = response.status();
        self.api.observe_status(status);
        if status.is_success() {
            return Ok(());
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(
                    status = status.as_u16(),
                    error = %err,
                    "rejection body unreadable"
                );
                String::new()
            }
        };
        Err(MutationError::Rejected {
            status_code: status.as_u16(),
            message: rejection_message(&body),
        })
    }
}

#[async_trait(?Send)]
impl RecordMutator for HttpRecordMutator {
    async fn delete(&self, id: &str) -> Result<(), MutationError> {
        let url = self.url(Some(id))?;
        tracing::debug!(%url, "DELETE record");
        self.send(self.api.delete(url)).await
    }

    async fn create(&self, body: &Value) -> Result<(), MutationError> {
        let url = self.url(None)?;
        tracing::debug!(%url, "POST record");
        self.send(self.api.post(url).json(body)).await
    }

    async fn update(&self, id: &str, body: &Value) -> Result<(), MutationError> {
        let url = self.url(Some(id))?;
        tracing::debug!(%url, "PATCH record");
        self.send(self.api.patch(url).json(body)).await
    }
}
