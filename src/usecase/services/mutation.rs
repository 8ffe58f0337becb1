use std::rc::Rc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::error::MutationError;
use crate::usecase::ports::mutator::RecordMutator;
use crate::usecase::services::table_engine::TableEngine;

/// Runs writes for one list view one at a time and refetches after each
/// successful write. Rows are never removed locally; the next page comes
/// from the API.
pub struct MutationCoordinator<T> {
    engine: TableEngine<T>,
    mutator: Rc<dyn RecordMutator>,
    gate: Rc<Mutex<()>>,
}

impl<T> Clone for MutationCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            mutator: Rc::clone(&self.mutator),
            gate: Rc::clone(&self.gate),
        }
    }
}

impl<T: Clone + 'static> MutationCoordinator<T> {
    pub fn new(engine: TableEngine<T>, mutator: Rc<dyn RecordMutator>) -> Self {
        Self {
            engine,
            mutator,
            gate: Rc::new(Mutex::new(())),
        }
    }

    pub fn engine(&self) -> &TableEngine<T> {
        &self.engine
    }

    /// Deleting the last row of a page past the first steps back one page
    /// instead of reloading a page that is now empty.
    pub async fn delete(&self, id: &str) -> Result<(), MutationError> {
        let _turn = self.gate.lock().await;
        let (page, rows_on_page) = self.engine.page_position();

        if let Err(err) = self.mutator.delete(id).await {
            return Err(self.fail("delete", id, err));
        }
        tracing::info!(id, page, "record deleted");
        self.engine.clear_mutation_error();

        if rows_on_page == Some(1) && page > 1 {
            self.engine.set_page(page - 1).await;
        } else {
            self.engine.refresh().await;
        }
        Ok(())
    }

    pub async fn create(&self, body: &Value) -> Result<(), MutationError> {
        let _turn = self.gate.lock().await;

        if let Err(err) = self.mutator.create(body).await {
            return Err(self.fail("create", "", err));
        }
        tracing::info!("record created");
        self.engine.clear_mutation_error();
        self.engine.refresh().await;
        Ok(())
    }

    pub async fn update(&self, id: &str, body: &Value) -> Result<(), MutationError> {
        let _turn = self.gate.lock().await;

        if let Err(err) = self.mutator.update(id, body).await {
            return Err(self.fail("update", id, err));
        }
        tracing::info!(id, "record updated");
        self.engine.clear_mutation_error();
        self.engine.refresh().await;
        Ok(())
    }

    fn fail(&self, action: &str, id: &str, err: MutationError) -> MutationError {
        tracing::warn!(action, id, error = %err, "mutation failed");
        self.engine.record_mutation_error(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::entities::column::{ColumnDescriptor, ColumnRegistry};
    use crate::domain::entities::page::{PageRequest, PageResult};
    use crate::domain::error::FetchError;
    use crate::usecase::ports::source::PageSource;
    use crate::usecase::services::table_state::TableStatus;

    /// In-memory listing whose rows can be removed through the mutator side.
    #[derive(Default)]
    struct Ledger {
        rows: RefCell<Vec<String>>,
        requests: RefCell<Vec<PageRequest>>,
        reject_with: RefCell<Option<MutationError>>,
    }

    #[async_trait(?Send)]
    impl PageSource<String> for Ledger {
        async fn fetch_page(
            &self,
            request: &PageRequest,
        ) -> Result<PageResult<String>, FetchError> {
            self.requests.borrow_mut().push(request.clone());
            let rows = self.rows.borrow();
            let items = rows
                .iter()
                .skip(request.offset() as usize)
                .take(request.size as usize)
                .cloned()
                .collect();
            Ok(PageResult::new(
                items,
                request.page,
                request.size,
                rows.len() as u64,
            ))
        }
    }

    #[async_trait(?Send)]
    impl RecordMutator for Ledger {
        async fn delete(&self, id: &str) -> Result<(), MutationError> {
            if let Some(err) = self.reject_with.borrow().clone() {
                return Err(err);
            }
            self.rows.borrow_mut().retain(|row| row != id);
            Ok(())
        }

        async fn create(&self, body: &Value) -> Result<(), MutationError> {
            let name = body["name"].as_str().unwrap_or_default().to_string();
            self.rows.borrow_mut().push(name);
            Ok(())
        }

        async fn update(&self, _id: &str, _body: &Value) -> Result<(), MutationError> {
            Ok(())
        }
    }

    fn coordinator(rows: usize, size: u32) -> (MutationCoordinator<String>, Rc<Ledger>) {
        let ledger = Rc::new(Ledger::default());
        ledger
            .rows
            .borrow_mut()
            .extend((1..=rows).map(|n| format!("zone-{n}")));
        let registry = Arc::new(
            ColumnRegistry::new("zones")
                .column(ColumnDescriptor::new("name", "Name").searchable().sortable()),
        );
        let engine =
            TableEngine::<String>::configure(registry, ledger.clone(), PageRequest::new(1, size))
                .expect("valid initial request");
        (MutationCoordinator::new(engine, ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn deleting_only_row_on_later_page_steps_back() {
        let (coordinator, ledger) = coordinator(21, 10);
        coordinator.engine().set_page(3).await;
        assert_eq!(coordinator.engine().snapshot().items(), &["zone-21".to_string()]);

        coordinator.delete("zone-21").await.expect("delete should succeed");

        let last = ledger.requests.borrow().last().cloned().expect("refetch issued");
        assert_eq!(last.page, 2);
        assert!(!ledger.requests.borrow().iter().skip(1).any(|r| r.page == 3));
        let snapshot = coordinator.engine().snapshot();
        assert_eq!(snapshot.items().len(), 10);
        assert_eq!(snapshot.total_pages(), Some(2));
    }

    #[tokio::test]
    async fn deleting_from_fuller_page_refreshes_in_place() {
        let (coordinator, ledger) = coordinator(25, 10);
        coordinator.engine().set_page(2).await;

        coordinator.delete("zone-12").await.expect("delete should succeed");

        assert_eq!(ledger.requests.borrow().last().map(|r| r.page), Some(2));
        assert_eq!(coordinator.engine().snapshot().items().len(), 10);
    }

    #[tokio::test]
    async fn deleting_last_row_on_first_page_stays_on_first_page() {
        let (coordinator, ledger) = coordinator(1, 10);
        coordinator.engine().load().await;

        coordinator.delete("zone-1").await.expect("delete should succeed");

        assert_eq!(ledger.requests.borrow().last().map(|r| r.page), Some(1));
        let snapshot = coordinator.engine().snapshot();
        assert_eq!(snapshot.status, TableStatus::Loaded);
        assert!(snapshot.items().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_leaves_table_untouched() {
        let (coordinator, ledger) = coordinator(5, 10);
        coordinator.engine().load().await;
        let before = coordinator.engine().snapshot();
        let rejection = MutationError::Rejected {
            status_code: 409,
            message: Some("zone has houses".to_string()),
        };
        *ledger.reject_with.borrow_mut() = Some(rejection.clone());

        let err = coordinator.delete("zone-1").await.unwrap_err();

        assert_eq!(err, rejection);
        let after = coordinator.engine().snapshot();
        assert_eq!(after.result, before.result);
        assert_eq!(after.latest_request_id, before.latest_request_id);
        assert_eq!(after.mutation_error, Some(rejection));
        assert_eq!(ledger.requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn create_refetches_current_page() {
        let (coordinator, ledger) = coordinator(2, 10);
        coordinator.engine().load().await;

        coordinator
            .create(&json!({"name": "zone-new"}))
            .await
            .expect("create should succeed");

        assert_eq!(ledger.requests.borrow().len(), 2);
        assert_eq!(coordinator.engine().snapshot().items().len(), 3);
    }
}
