use async_trait::async_trait;

use crate::domain::entities::page::{PageRequest, PageResult};
use crate::domain::error::FetchError;

/// Fetches one page of a single entity listing.
///
/// Implementations keep no per-request state, so overlapping calls for
/// different requests are fine.
#[async_trait(?Send)]
pub trait PageSource<T> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>, FetchError>;
}
