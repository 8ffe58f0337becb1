use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::domain::entities::column::ColumnRegistry;
use crate::domain::entities::page::{PageRequest, SortDirection};
use crate::domain::error::{MutationError, ValidationError};
use crate::usecase::ports::source::PageSource;
use crate::usecase::services::table_state::{Applied, FetchTicket, TableSnapshot, TableState};

type Listener<T> = Rc<dyn Fn(TableSnapshot<T>)>;

/// Drives one list view: owns its [`TableState`], runs fetches through the
/// configured [`PageSource`] and tells the listener about every transition.
///
/// Cloning yields another handle to the same table. Handles are meant for a
/// single UI thread; several fetches may be in flight, and only the last
/// issued one lands.
pub struct TableEngine<T> {
    state: Rc<RefCell<TableState<T>>>,
    source: Rc<dyn PageSource<T>>,
    listener: Rc<RefCell<Option<Listener<T>>>>,
}

impl<T> Clone for TableEngine<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            source: Rc::clone(&self.source),
            listener: Rc::clone(&self.listener),
        }
    }
}

impl<T: Clone + 'static> TableEngine<T> {
    pub fn configure(
        registry: Arc<ColumnRegistry>,
        source: Rc<dyn PageSource<T>>,
        initial: PageRequest,
    ) -> Result<Self, ValidationError> {
        let state = TableState::configure(registry, initial)?;
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            source,
            listener: Rc::new(RefCell::new(None)),
        })
    }

    pub fn set_listener(&self, listener: impl Fn(TableSnapshot<T>) + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn snapshot(&self) -> TableSnapshot<T> {
        self.state.borrow().snapshot()
    }

    pub fn registry(&self) -> Arc<ColumnRegistry> {
        Arc::clone(self.state.borrow().registry())
    }

    pub fn page_position(&self) -> (u32, Option<usize>) {
        self.state.borrow().page_position()
    }

    /// First fetch after mounting; same as [`TableEngine::refresh`].
    pub async fn load(&self) {
        self.refresh().await;
    }

    pub async fn refresh(&self) {
        let ticket = self.state.borrow_mut().refresh();
        self.run(ticket).await;
    }

    pub async fn set_page(&self, page: u32) {
        let ticket = self.state.borrow_mut().set_page(page);
        self.run(ticket).await;
    }

    pub async fn set_page_size(&self, size: u32) -> Result<(), ValidationError> {
        let ticket = self.guard(|state| state.set_page_size(size))?;
        self.run(ticket).await;
        Ok(())
    }

    pub async fn set_search(&self, term: impl Into<String>) -> Result<(), ValidationError> {
        let term = term.into();
        let ticket = self.guard(|state| state.set_search(term))?;
        self.run(ticket).await;
        Ok(())
    }

    /// Rejected filters never reach the source; the error is also kept in
    /// the snapshot.
    pub async fn set_filter<I, S>(&self, field: &str, values: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ticket = self.guard(|state| state.set_filter(field, values))?;
        self.run(ticket).await;
        Ok(())
    }

    pub async fn clear_filters(&self) {
        let ticket = self.state.borrow_mut().clear_filters();
        self.run(ticket).await;
    }

    pub async fn set_sort(
        &self,
        field: &str,
        direction: SortDirection,
    ) -> Result<(), ValidationError> {
        let ticket = self.guard(|state| state.set_sort(field, direction))?;
        self.run(ticket).await;
        Ok(())
    }

    pub async fn clear_sort(&self) {
        let ticket = self.state.borrow_mut().clear_sort();
        self.run(ticket).await;
    }

    /// Called when the view goes away; late responses are dropped from now on.
    pub fn detach(&self) {
        self.state.borrow_mut().detach();
        self.listener.borrow_mut().take();
    }

    pub fn record_mutation_error(&self, err: MutationError) {
        self.state.borrow_mut().record_mutation_error(err);
        self.notify();
    }

    pub fn clear_mutation_error(&self) {
        self.state.borrow_mut().clear_mutation_error();
    }

    fn guard(
        &self,
        action: impl FnOnce(&mut TableState<T>) -> Result<Option<FetchTicket>, ValidationError>,
    ) -> Result<Option<FetchTicket>, ValidationError> {
        let outcome = action(&mut *self.state.borrow_mut());
        if outcome.is_err() {
            self.notify();
        }
        outcome
    }

    async fn run(&self, ticket: Option<FetchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        self.notify();

        let outcome = self.source.fetch_page(&ticket.request).await;

        let applied = self.state.borrow_mut().apply(&ticket, outcome);
        if applied == Applied::Applied {
            self.notify();
        }
    }

    fn notify(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(self.snapshot());
        }
    }
}
