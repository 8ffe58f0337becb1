use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use crate::domain::entities::page::PageRequest;
use crate::domain::error::{FetchError, MutationError};
use crate::usecase::ports::session::Session;

const USER_AGENT_VALUE: &str = concat!("vega-admin/", env!("CARGO_PKG_VERSION"));

/// A request URL could not be built; nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid url `{url}`: {reason}")]
pub struct InvalidUrl {
    pub url: String,
    pub reason: String,
}

impl InvalidUrl {
    fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<InvalidUrl> for FetchError {
    fn from(err: InvalidUrl) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<InvalidUrl> for MutationError {
    fn from(err: InvalidUrl) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Shared HTTP plumbing for every entity endpoint.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn Session>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        session: Arc<dyn Session>,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("invalid api base url: {base_url}"))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to create http client")?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}{endpoint}`, plus `id` as one percent-encoded path segment.
    pub fn resource_url(&self, endpoint: &str, id: Option<&str>) -> Result<Url, InvalidUrl> {
        let raw = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|err| InvalidUrl::new(&raw, err.to_string()))?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|()| InvalidUrl::new(&raw, "url cannot carry a path"))?
                .pop_if_empty()
                .push(id);
        }
        Ok(url)
    }

    pub fn list_url(&self, endpoint: &str, request: &PageRequest) -> Result<Url, InvalidUrl> {
        let mut url = self.resource_url(endpoint, None)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in query_params(request) {
                query.append_pair(&key, &value);
            }
        }
        Ok(url)
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.post(url))
    }

    pub(crate) fn patch(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.patch(url))
    }

    pub(crate) fn delete(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.delete(url))
    }

    /// Lets the session forget its credential when the API says it is no
    /// longer valid.
    pub(crate) fn observe_status(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            self.session.on_unauthorized();
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Listing query parameters, in a stable order.
pub fn query_params(request: &PageRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), request.page.to_string()),
        ("size".to_string(), request.size.to_string()),
    ];
    if let Some(search) = &request.search {
        params.push(("search".to_string(), search.clone()));
    }
    if let Some(sort) = &request.sort {
        params.push(("sortBy".to_string(), sort.field.clone()));
        params.push((
            "sortDirection".to_string(),
            sort.direction.as_str().to_string(),
        ));
    }
    for (field, values) in &request.filters {
        for value in values {
            params.push((field.clone(), value.clone()));
        }
    }
    params
}

/// Human-readable reason from an error body, if the API gave one.
pub fn rejection_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return ["message", "messageResponse", "title", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string);
    }
    Some(trimmed.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::page::SortDirection;
    use crate::infra::session::static_token::StaticSession;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, None, Arc::new(StaticSession::new(None))).expect("client should build")
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = ApiClient::new("not a url", None, Arc::new(StaticSession::new(None)));
        assert!(result.is_err());
    }

    #[test]
    fn resource_url_keeps_base_path_prefix() {
        let api = client("https://api.vegacity.vn/gateway/");

        let url = api
            .resource_url("/api/v1/stores", Some("7f3c"))
            .expect("url should build");

        assert_eq!(url.as_str(), "https://api.vegacity.vn/gateway/api/v1/stores/7f3c");
    }

    #[test]
    fn record_id_stays_one_path_segment() {
        let api = client("http://localhost:5000");

        let climbing = api
            .resource_url("/api/v1/stores", Some("../users/42"))
            .expect("url should build");
        assert_eq!(
            climbing.as_str(),
            "http://localhost:5000/api/v1/stores/..%2Fusers%2F42"
        );

        let punctuated = api
            .resource_url("/api/v1/stores", Some("a?b#c"))
            .expect("url should build");
        assert_eq!(punctuated.path(), "/api/v1/stores/a%3Fb%23c");
        assert_eq!(punctuated.query(), None);
        assert_eq!(punctuated.fragment(), None);
    }

    #[test]
    fn url_failures_are_local_request_errors() {
        let api = client("mailto:ops@vegacity.vn");
        let err = api
            .resource_url("/api/v1/stores", Some("s1"))
            .unwrap_err();

        let fetch = FetchError::from(err.clone());
        assert!(matches!(fetch, FetchError::InvalidRequest(_)));
        assert!(!fetch.is_retryable());

        let mutation = MutationError::from(err);
        assert_eq!(
            mutation.to_string(),
            "invalid request: invalid url `mailto:ops@vegacity.vn/api/v1/stores`: url cannot carry a path"
        );
    }

    #[test]
    fn list_url_encodes_paging_search_sort_and_filters() {
        let api = client("http://localhost:5000");
        let request = PageRequest::new(2, 20)
            .with_search("com tam")
            .with_sort("name", SortDirection::Desc)
            .with_filter("status", ["Opened", "Closed"]);

        let url = api
            .list_url("/api/v1/stores", &request)
            .expect("url should build");

        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/v1/stores?page=2&size=20&search=com+tam&sortBy=name&sortDirection=desc&status=Closed&status=Opened"
        );
    }

    #[test]
    fn minimal_request_only_sends_paging() {
        let params = query_params(&PageRequest::default());
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn rejection_message_prefers_api_fields() {
        assert_eq!(
            rejection_message(r#"{"statusCode":400,"messageResponse":"Zone not found"}"#).as_deref(),
            Some("Zone not found")
        );
        assert_eq!(rejection_message(r#"{"statusCode":500}"#), None);
        assert_eq!(rejection_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(rejection_message("  "), None);
    }
}
