use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::column::ColumnRegistry;
use crate::domain::error::{ValidationError, ValidationReason};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Query for one page of a listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
    pub filters: BTreeMap<String, BTreeSet<String>>,
    pub sort: Option<SortSpec>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            search: None,
            filters: BTreeMap::new(),
            sort: None,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = normalize_search(term.into());
        self
    }

    pub fn with_filter<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .insert(field.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec::new(field, direction));
        self
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Same result set and page size; only the page may differ.
    pub fn same_query(&self, other: &PageRequest) -> bool {
        self.size == other.size
            && self.search == other.search
            && self.filters == other.filters
            && self.sort == other.sort
    }
}

/// Blank terms mean "no search".
pub fn normalize_search(term: String) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Checks a request against the registry and hands it back unchanged when
/// every part of it is acceptable.
pub fn validate(
    request: PageRequest,
    registry: &ColumnRegistry,
) -> Result<PageRequest, ValidationError> {
    if request.page < 1 {
        return Err(ValidationError::new("page", ValidationReason::PageOutOfRange));
    }
    if request.size < 1 {
        return Err(ValidationError::new("size", ValidationReason::SizeOutOfRange));
    }

    if request.search.is_some() && !registry.has_searchable() {
        return Err(ValidationError::new("search", ValidationReason::NotSearchable));
    }

    for (field, values) in &request.filters {
        let column = registry
            .describe(field)
            .ok_or_else(|| ValidationError::new(field, ValidationReason::UnknownField))?;
        if !column.is_filterable() {
            return Err(ValidationError::new(field, ValidationReason::NotFilterable));
        }
        if values.is_empty() {
            return Err(ValidationError::new(field, ValidationReason::EmptySelection));
        }
        if let Some(rejected) = values.iter().find(|value| !column.accepts(value)) {
            return Err(ValidationError::new(
                field,
                ValidationReason::ValueNotAllowed(rejected.clone()),
            ));
        }
    }

    if let Some(sort) = &request.sort {
        let column = registry
            .describe(&sort.field)
            .ok_or_else(|| ValidationError::new(&sort.field, ValidationReason::UnknownField))?;
        if !column.sortable {
            return Err(ValidationError::new(&sort.field, ValidationReason::NotSortable));
        }
    }

    Ok(request)
}

/// One page of a listing as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, page: u32, size: u32, total: u64) -> Self {
        Self {
            items,
            page,
            size,
            total,
            total_pages: total_pages(total, size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `ceil(total / size)`; zero when nothing matches.
pub fn total_pages(total: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
