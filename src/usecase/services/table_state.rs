use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::entities::column::ColumnRegistry;
use crate::domain::entities::page::{
    normalize_search, validate, PageRequest, PageResult, SortDirection, SortSpec,
};
use crate::domain::error::{FetchError, MutationError, ValidationError, ValidationReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A fetch the state machine has issued and is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale,
    Detached,
}

/// Read-only view handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot<T> {
    pub status: TableStatus,
    pub request: PageRequest,
    pub result: Option<PageResult<T>>,
    pub error: Option<FetchError>,
    pub validation_error: Option<ValidationError>,
    pub mutation_error: Option<MutationError>,
    pub latest_request_id: u64,
}

impl<T> TableSnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.status == TableStatus::Loading
    }

    pub fn items(&self) -> &[T] {
        self.result
            .as_ref()
            .map(|result| result.items.as_slice())
            .unwrap_or_default()
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.result.as_ref().map(|result| result.total_pages)
    }
}

/// Paging/search/filter/sort state of one list view.
///
/// Every state-changing action returns the [`FetchTicket`] to run; the
/// outcome goes back through [`TableState::apply`], which only accepts the
/// most recently issued ticket.
#[derive(Debug)]
pub struct TableState<T> {
    registry: Arc<ColumnRegistry>,
    request: PageRequest,
    result: Option<PageResult<T>>,
    /// The request `result` answered.
    result_request: Option<PageRequest>,
    status: TableStatus,
    error: Option<FetchError>,
    validation_error: Option<ValidationError>,
    mutation_error: Option<MutationError>,
    latest_request_id: u64,
    detached: bool,
}

impl<T> TableState<T> {
    pub fn configure(
        registry: Arc<ColumnRegistry>,
        initial: PageRequest,
    ) -> Result<Self, ValidationError> {
        let request = validate(initial, &registry)?;
        Ok(Self {
            registry,
            request,
            result: None,
            result_request: None,
            status: TableStatus::Idle,
            error: None,
            validation_error: None,
            mutation_error: None,
            latest_request_id: 0,
            detached: false,
        })
    }

    pub fn registry(&self) -> &Arc<ColumnRegistry> {
        &self.registry
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn result(&self) -> Option<&PageResult<T>> {
        self.result.as_ref()
    }

    pub fn status(&self) -> TableStatus {
        self.status
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn mutation_error(&self) -> Option<&MutationError> {
        self.mutation_error.as_ref()
    }

    pub fn latest_request_id(&self) -> u64 {
        self.latest_request_id
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Page requested by the current query and the number of rows shown
    /// on it. The row count is `None` unless the held result answered
    /// exactly the current request.
    pub fn page_position(&self) -> (u32, Option<usize>) {
        let rows = match (&self.result, &self.result_request) {
            (Some(result), Some(answered)) if *answered == self.request => {
                Some(result.items.len())
            }
            _ => None,
        };
        (self.request.page, rows)
    }

    /// Page count of the current query, if the held result belongs to it.
    fn known_total_pages(&self) -> Option<u32> {
        match (&self.result, &self.result_request) {
            (Some(result), Some(answered)) if answered.same_query(&self.request) => {
                Some(result.total_pages)
            }
            _ => None,
        }
    }

    /// Clamped to `[1, total_pages]` once the current query's page count is
    /// known.
    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket> {
        let target = match self.known_total_pages() {
            Some(total_pages) => page.min(total_pages).max(1),
            None => page.max(1),
        };
        let mut next = self.request.clone();
        next.page = target;
        self.issue(next)
    }

    pub fn set_page_size(&mut self, size: u32) -> Result<Option<FetchTicket>, ValidationError> {
        let mut next = self.request.clone();
        next.size = size;
        next.page = 1;
        self.issue_validated(next)
    }

    pub fn set_search(
        &mut self,
        term: impl Into<String>,
    ) -> Result<Option<FetchTicket>, ValidationError> {
        let mut next = self.request.clone();
        next.search = normalize_search(term.into());
        next.page = 1;
        self.issue_validated(next)
    }

    /// An empty `values` clears the filter on `field`.
    pub fn set_filter<I, S>(
        &mut self,
        field: &str,
        values: I,
    ) -> Result<Option<FetchTicket>, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        let mut next = self.request.clone();
        if values.is_empty() {
            let reason = match self.registry.describe(field) {
                None => Some(ValidationReason::UnknownField),
                Some(column) if !column.is_filterable() => Some(ValidationReason::NotFilterable),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                return Err(self.reject(ValidationError::new(field, reason)));
            }
            next.filters.remove(field);
        } else {
            next.filters.insert(field.to_string(), values);
        }
        next.page = 1;
        self.issue_validated(next)
    }

    pub fn clear_filters(&mut self) -> Option<FetchTicket> {
        let mut next = self.request.clone();
        next.filters.clear();
        next.page = 1;
        self.issue(next)
    }

    /// Keeps the current page; the result set itself does not change.
    pub fn set_sort(
        &mut self,
        field: &str,
        direction: SortDirection,
    ) -> Result<Option<FetchTicket>, ValidationError> {
        let mut next = self.request.clone();
        next.sort = Some(SortSpec::new(field, direction));
        self.issue_validated(next)
    }

    pub fn clear_sort(&mut self) -> Option<FetchTicket> {
        let mut next = self.request.clone();
        next.sort = None;
        self.issue(next)
    }

    /// Re-issues the current request unchanged.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let current = self.request.clone();
        self.issue(current)
    }

    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<PageResult<T>, FetchError>,
    ) -> Applied {
        if self.detached {
            tracing::debug!(
                entity = self.registry.entity(),
                request_id = ticket.request_id,
                "dropping response for detached table"
            );
            return Applied::Detached;
        }
        if ticket.request_id != self.latest_request_id {
            tracing::debug!(
                entity = self.registry.entity(),
                request_id = ticket.request_id,
                latest_request_id = self.latest_request_id,
                "discarding stale response"
            );
            return Applied::Stale;
        }

        match outcome {
            Ok(result) => {
                tracing::info!(
                    entity = self.registry.entity(),
                    request_id = ticket.request_id,
                    page = result.page,
                    items = result.items.len(),
                    total = result.total,
                    "page loaded"
                );
                self.result = Some(result);
                self.result_request = Some(ticket.request.clone());
                self.error = None;
                self.status = TableStatus::Loaded;
            }
            Err(err) => {
                tracing::warn!(
                    entity = self.registry.entity(),
                    request_id = ticket.request_id,
                    error = %err,
                    "page fetch failed"
                );
                self.result = None;
                self.result_request = None;
                self.error = Some(err);
                self.status = TableStatus::Failed;
            }
        }
        Applied::Applied
    }

    /// After this, no ticket is issued and no response is applied.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    pub fn record_mutation_error(&mut self, err: MutationError) {
        self.mutation_error = Some(err);
    }

    pub fn clear_mutation_error(&mut self) {
        self.mutation_error = None;
    }

    fn issue_validated(
        &mut self,
        next: PageRequest,
    ) -> Result<Option<FetchTicket>, ValidationError> {
        match validate(next, &self.registry) {
            Ok(next) => Ok(self.issue(next)),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&mut self, err: ValidationError) -> ValidationError {
        tracing::warn!(entity = self.registry.entity(), error = %err, "rejected table action");
        self.validation_error = Some(err.clone());
        err
    }

    fn issue(&mut self, next: PageRequest) -> Option<FetchTicket> {
        if self.detached {
            return None;
        }
        self.latest_request_id += 1;
        self.request = next;
        self.status = TableStatus::Loading;
        self.validation_error = None;
        tracing::debug!(
            entity = self.registry.entity(),
            request_id = self.latest_request_id,
            page = self.request.page,
            size = self.request.size,
            "issuing page fetch"
        );
        Some(FetchTicket {
            request_id: self.latest_request_id,
            request: self.request.clone(),
        })
    }
}

impl<T: Clone> TableState<T> {
    pub fn snapshot(&self) -> TableSnapshot<T> {
        TableSnapshot {
            status: self.status,
            request: self.request.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
            validation_error: self.validation_error.clone(),
            mutation_error: self.mutation_error.clone(),
            latest_request_id: self.latest_request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::column::ColumnDescriptor;

    fn registry() -> Arc<ColumnRegistry> {
        Arc::new(
            ColumnRegistry::new("houses")
                .column(ColumnDescriptor::new("houseName", "House").searchable().sortable())
                .column(ColumnDescriptor::new("isRent", "Rented").filterable(["true", "false"])),
        )
    }

    fn state() -> TableState<u32> {
        TableState::configure(registry(), PageRequest::new(1, 10)).expect("valid initial request")
    }

    fn page_of(request: &PageRequest, total: u64) -> PageResult<u32> {
        let start = request.offset();
        let end = (start + u64::from(request.size)).min(total);
        let items = (start..end).map(|n| n as u32).collect();
        PageResult::new(items, request.page, request.size, total)
    }

    fn load(state: &mut TableState<u32>, ticket: Option<FetchTicket>, total: u64) {
        let ticket = ticket.expect("ticket should be issued");
        let outcome = Ok(page_of(&ticket.request, total));
        assert_eq!(state.apply(&ticket, outcome), Applied::Applied);
    }

    #[test]
    fn starts_idle_and_moves_through_loading() {
        let mut state = state();
        assert_eq!(state.status(), TableStatus::Idle);
        assert!(state.result().is_none());

        let ticket = state.refresh();
        assert_eq!(state.status(), TableStatus::Loading);

        load(&mut state, ticket, 25);
        assert_eq!(state.status(), TableStatus::Loaded);
        assert_eq!(state.result().map(|r| r.total_pages), Some(3));
    }

    #[test]
    fn configure_rejects_invalid_initial_request() {
        let err = TableState::<u32>::configure(registry(), PageRequest::new(0, 10)).unwrap_err();
        assert_eq!(err.reason, ValidationReason::PageOutOfRange);
    }

    #[test]
    fn set_page_clamps_against_known_total_pages() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 25);

        for (requested, expected) in [(0, 1), (1, 1), (2, 2), (3, 3), (4, 3), (u32::MAX, 3)] {
            let ticket = state.set_page(requested).expect("ticket");
            assert_eq!(ticket.request.page, expected, "set_page({requested})");
        }
    }

    #[test]
    fn set_page_without_result_accepts_as_is() {
        let mut state = state();
        assert_eq!(state.set_page(7).map(|t| t.request.page), Some(7));
        assert_eq!(state.set_page(0).map(|t| t.request.page), Some(1));
    }

    #[test]
    fn set_page_on_empty_listing_lands_on_first_page() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 0);

        assert_eq!(state.set_page(5).map(|t| t.request.page), Some(1));
    }

    #[test]
    fn set_page_ignores_page_count_of_a_replaced_query() {
        let mut state = state();
        let ticket = state.set_search("villa").expect("searchable");
        load(&mut state, ticket, 25);

        // full listing still in flight; the 3-page search result no longer applies
        let _ = state.set_search("").expect("searchable");
        assert_eq!(state.set_page(8).map(|t| t.request.page), Some(8));
    }

    #[test]
    fn set_page_while_paging_the_same_query_still_clamps() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 25);

        let _ = state.set_page(2);
        assert_eq!(state.status(), TableStatus::Loading);
        assert_eq!(state.set_page(9).map(|t| t.request.page), Some(3));
    }

    #[test]
    fn page_position_only_counts_rows_of_the_current_request() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 21);
        let ticket = state.set_page(3);
        load(&mut state, ticket, 21);
        assert_eq!(state.page_position(), (3, Some(1)));

        let _ = state.set_page(2);
        assert_eq!(state.page_position(), (2, None));
    }

    #[test]
    fn search_filter_and_size_reset_page() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 95);
        let ticket = state.set_page(4);
        load(&mut state, ticket, 95);

        let ticket = state.set_search("villa").expect("searchable").expect("ticket");
        assert_eq!(ticket.request.page, 1);
        assert_eq!(ticket.request.search.as_deref(), Some("villa"));
        load(&mut state, Some(ticket), 95);

        let ticket = state.set_page(2);
        load(&mut state, ticket, 95);
        let ticket = state.set_filter("isRent", ["true"]).expect("valid").expect("ticket");
        assert_eq!(ticket.request.page, 1);

        let ticket = state.set_page_size(50).expect("valid").expect("ticket");
        assert_eq!((ticket.request.page, ticket.request.size), (1, 50));
    }

    #[test]
    fn sort_keeps_page() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 40);
        let ticket = state.set_page(3);
        load(&mut state, ticket, 40);

        let ticket = state
            .set_sort("houseName", SortDirection::Desc)
            .expect("sortable")
            .expect("ticket");
        assert_eq!(ticket.request.page, 3);
        assert_eq!(
            ticket.request.sort,
            Some(SortSpec::new("houseName", SortDirection::Desc))
        );

        assert_eq!(state.clear_sort().and_then(|t| t.request.sort), None);
    }

    #[test]
    fn unknown_filter_is_rejected_without_issuing() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 12);
        let before = state.snapshot();

        let err = state.set_filter("nonexistentField", ["x"]).unwrap_err();

        assert_eq!(err.field, "nonexistentField");
        assert_eq!(state.latest_request_id(), before.latest_request_id);
        assert_eq!(state.request(), &before.request);
        assert_eq!(state.status(), TableStatus::Loaded);
        assert_eq!(state.validation_error(), Some(&err));

        // the next accepted action clears it
        let _ = state.refresh();
        assert!(state.validation_error().is_none());
    }

    #[test]
    fn empty_filter_values_clear_the_filter() {
        let mut state = state();
        let _ = state.set_filter("isRent", ["false"]).expect("valid");
        assert!(state.request().filters.contains_key("isRent"));

        let _ = state.set_filter("isRent", Vec::<String>::new()).expect("valid");
        assert!(state.request().filters.is_empty());

        let err = state.set_filter("ghost", Vec::<String>::new()).unwrap_err();
        assert_eq!(err.reason, ValidationReason::UnknownField);

        let err = state.set_filter("houseName", Vec::<String>::new()).unwrap_err();
        assert_eq!(err.reason, ValidationReason::NotFilterable);
    }

    #[test]
    fn late_response_to_older_request_is_discarded() {
        let mut state = state();
        let first = state.set_search("a").expect("valid").expect("ticket");
        let second = state.set_search("b").expect("valid").expect("ticket");

        let second_result = PageResult::new(vec![200], 1, 10, 1);
        assert_eq!(
            state.apply(&second, Ok(second_result.clone())),
            Applied::Applied
        );
        assert_eq!(
            state.apply(&first, Ok(PageResult::new(vec![100, 101], 1, 10, 2))),
            Applied::Stale
        );

        assert_eq!(state.result(), Some(&second_result));
        assert_eq!(state.request().search.as_deref(), Some("b"));
    }

    #[test]
    fn stale_failure_does_not_clobber_newer_result() {
        let mut state = state();
        let first = state.refresh().expect("ticket");
        let second = state.set_page(2).expect("ticket");

        let _ = state.apply(&second, Ok(PageResult::new(vec![11], 2, 10, 11)));
        let applied = state.apply(&first, Err(FetchError::Network("reset".to_string())));

        assert_eq!(applied, Applied::Stale);
        assert_eq!(state.status(), TableStatus::Loaded);
        assert!(state.error().is_none());
    }

    #[test]
    fn failure_discards_previous_items() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 25);

        let ticket = state.refresh().expect("ticket");
        let rejected = FetchError::ServerRejected {
            status_code: 500,
            message: None,
        };
        let _ = state.apply(&ticket, Err(rejected.clone()));

        assert_eq!(state.status(), TableStatus::Failed);
        assert_eq!(state.error(), Some(&rejected));
        assert!(state.result().is_none());
    }

    #[test]
    fn detached_state_drops_everything() {
        let mut state = state();
        let ticket = state.refresh().expect("ticket");
        state.detach();

        assert_eq!(
            state.apply(&ticket, Ok(PageResult::new(vec![1], 1, 10, 1))),
            Applied::Detached
        );
        assert!(state.result().is_none());
        assert!(state.set_page(2).is_none());
        assert!(state.refresh().is_none());
    }

    #[test]
    fn empty_result_is_loaded_not_idle() {
        let mut state = state();
        let ticket = state.refresh();
        load(&mut state, ticket, 0);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.status, TableStatus::Loaded);
        assert!(snapshot.items().is_empty());
        assert_eq!(snapshot.total_pages(), Some(0));
    }
}
