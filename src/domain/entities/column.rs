/// One accepted value of a filterable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub field: String,
    pub title: String,
    pub searchable: bool,
    /// `Some` when the column can be filtered; holds the fixed option set.
    pub filter_options: Option<Vec<FilterOption>>,
    pub sortable: bool,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            searchable: false,
            filter_options: None,
            sortable: false,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Option values double as labels.
    pub fn filterable<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_options = Some(
            values
                .into_iter()
                .map(|value| {
                    let value = value.into();
                    FilterOption::new(value.clone(), value)
                })
                .collect(),
        );
        self
    }

    pub fn filterable_with(mut self, options: Vec<FilterOption>) -> Self {
        self.filter_options = Some(options);
        self
    }

    pub fn is_filterable(&self) -> bool {
        self.filter_options.is_some()
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.filter_options
            .as_ref()
            .is_some_and(|options| options.iter().any(|option| option.value == value))
    }
}

/// Static per-entity column declaration shared by request validation and
/// rendering. Column order is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRegistry {
    entity: String,
    columns: Vec<ColumnDescriptor>,
}

impl ColumnRegistry {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column, replacing an earlier declaration of the same field.
    pub fn column(mut self, descriptor: ColumnDescriptor) -> Self {
        match self
            .columns
            .iter_mut()
            .find(|existing| existing.field == descriptor.field)
        {
            Some(existing) => *existing = descriptor,
            None => self.columns.push(descriptor),
        }
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn describe(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.field == field)
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.searchable)
            .map(|column| column.field.as_str())
    }

    pub fn has_searchable(&self) -> bool {
        self.searchable_fields().next().is_some()
    }

    pub fn filterable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|column| column.is_filterable())
    }
}
