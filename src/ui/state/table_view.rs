use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;

use vega_admin::domain::entities::entity::EntityKind;
use vega_admin::domain::entities::page::PageRequest;
use vega_admin::domain::entities::record::Record;
use vega_admin::infra::http::mutator::HttpRecordMutator;
use vega_admin::infra::http::source::HttpPageSource;
use vega_admin::usecase::services::mutation::MutationCoordinator;
use vega_admin::usecase::services::table_engine::TableEngine;
use vega_admin::usecase::services::table_state::TableSnapshot;

use crate::ui::state::services::AppServices;

/// Per-view signals mirroring the engine, plus the coordinator that drives it.
#[derive(Clone)]
pub struct TableView {
    pub coordinator: MutationCoordinator<Record>,
    pub snapshot: Signal<Option<TableSnapshot<Record>>>,
    pub search_input: Signal<String>,
    pub notice: Signal<String>,
}

impl TableView {
    pub fn engine(&self) -> &TableEngine<Record> {
        self.coordinator.engine()
    }
}

fn build_coordinator(
    entity: EntityKind,
    services: &AppServices,
) -> Result<MutationCoordinator<Record>, String> {
    let registry = Arc::new(entity.registry());
    let source = Rc::new(HttpPageSource::<Record>::new(
        services.api.clone(),
        entity.endpoint(),
    ));
    let initial = PageRequest::new(1, services.config.default_page_size);
    let engine = TableEngine::<Record>::configure(registry, source, initial)
        .map_err(|err| err.to_string())?;
    let mutator = Rc::new(HttpRecordMutator::new(services.api.clone(), entity.endpoint()));
    Ok(MutationCoordinator::new(engine, mutator))
}

/// Mounts one list view: wires the engine to a signal, issues the first
/// fetch and detaches the engine on unmount.
pub fn use_table_view(entity: EntityKind) -> Result<TableView, String> {
    let services = use_context::<AppServices>();
    let built = use_hook(move || build_coordinator(entity, &services));

    let snapshot = use_signal({
        let built = built.clone();
        move || built.as_ref().ok().map(|coordinator| coordinator.engine().snapshot())
    });
    let search_input = use_signal(String::new);
    let notice = use_signal(String::new);

    use_hook({
        let built = built.clone();
        move || {
            if let Ok(coordinator) = &built {
                let engine = coordinator.engine().clone();
                engine.set_listener(move |next| {
                    let mut snapshot = snapshot;
                    snapshot.set(Some(next));
                });
                spawn(async move {
                    engine.load().await;
                });
            }
        }
    });

    use_drop({
        let built = built.clone();
        move || {
            if let Ok(coordinator) = &built {
                coordinator.engine().detach();
            }
        }
    });

    built.map(|coordinator| TableView {
        coordinator,
        snapshot,
        search_input,
        notice,
    })
}

// Signals compare by identity, so this is "same mounted table".
impl PartialEq for TableView {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot
    }
}
