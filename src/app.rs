use std::sync::OnceLock;

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use vega_admin::config::{default_export_dir, AppConfig};
use vega_admin::domain::entities::column::ColumnDescriptor;
use vega_admin::domain::entities::entity::EntityKind;
use vega_admin::domain::entities::page::{SortDirection, SortSpec};
use vega_admin::domain::entities::record::{Record, TableRow};
use vega_admin::infra::export::csv::{default_export_file_name, export_rows_to_path};
use vega_admin::usecase::services::table_state::{TableSnapshot, TableStatus};

use crate::ui::state::services::AppServices;
use crate::ui::state::table_view::{use_table_view, TableView};
use crate::ui::styles::{
    button_style, nav_item_style, table_cell_style, table_container_style,
    table_header_cell_style,
};

const PAGE_SIZE_CHOICES: [u32; 4] = [10, 20, 50, 100];
const ALL_OPTION_VALUE: &str = "__all__";

/// Set by `main` before launch.
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

#[component]
pub fn App() -> Element {
    let services = use_hook(|| {
        let config = APP_CONFIG.get().cloned().unwrap_or_default();
        AppServices::new(config).map_err(|err| format!("{err:#}"))
    });
    let mut selected = use_signal(|| EntityKind::Zones);

    let services = match services {
        Ok(services) => services,
        Err(err) => {
            return rsx! {
                div {
                    p { "Unable to configure the API client: {err}" }
                }
            };
        }
    };
    use_context_provider(|| services.clone());
    let base_url = services.api.base_url().to_string();
    let signed_in = services.session.is_signed_in();

    rsx! {
        div { style: "display: flex; height: 100vh; font-family: sans-serif;",
            nav { style: "width: 200px; padding: 12px; border-right: 1px solid #ddd; background: #fafafa;",
                h3 { "VegaCity Admin" }
                for kind in EntityKind::ALL {
                    button {
                        style: "{nav_item_style(selected() == kind)}",
                        onclick: move |_| selected.set(kind),
                        "{kind}"
                    }
                }
                p { style: "margin-top: 16px; font-size: 12px; color: #666;", "{base_url}" }
                if !signed_in {
                    p { style: "font-size: 12px; color: #d24;", "No API token configured" }
                }
            }
            main { style: "flex: 1; padding: 16px; overflow: hidden;",
                TablePanel { key: "{selected().key()}", entity: selected() }
            }
        }
    }
}

#[component]
fn TablePanel(entity: EntityKind) -> Element {
    let view = match use_table_view(entity) {
        Ok(view) => view,
        Err(err) => {
            return rsx! {
                p { "Unable to set up {entity}: {err}" }
            };
        }
    };
    let Some(snapshot) = view.snapshot.read().clone() else {
        return rsx! {
            p { "Loading {entity}…" }
        };
    };
    let registry = view.engine().registry();
    let columns = registry.columns().to_vec();
    let filter_columns: Vec<ColumnDescriptor> = registry.filterable_columns().cloned().collect();
    let rows = snapshot.items().to_vec();
    let notice = view.notice.read().clone();
    let status_line = status_line(&snapshot, &notice);
    let page = snapshot.request.page;
    let total_pages = snapshot.total_pages().unwrap_or(0);
    let total = snapshot.result.as_ref().map(|result| result.total).unwrap_or(0);
    let busy = snapshot.is_loading();
    let can_delete = entity.supports_delete();
    let current_sort = snapshot.request.sort.clone();

    rsx! {
        h2 { "{entity}" }

        div { style: "display: flex; flex-wrap: wrap; gap: 8px; align-items: center; margin-bottom: 12px;",
            if registry.has_searchable() {
                input {
                    r#type: "search",
                    placeholder: "Search",
                    value: "{view.search_input}",
                    oninput: {
                        let mut search_input = view.search_input;
                        move |event: FormEvent| search_input.set(event.value())
                    },
                    onkeydown: {
                        let view = view.clone();
                        move |event: KeyboardEvent| {
                            if event.key() == Key::Enter {
                                submit_search(&view);
                            }
                        }
                    },
                }
                button {
                    style: "{button_style()}",
                    onclick: {
                        let view = view.clone();
                        move |_| submit_search(&view)
                    },
                    "Search"
                }
            }

            for column in filter_columns {
                FilterSelect {
                    key: "{column.field}",
                    view: view.clone(),
                    selected: snapshot
                        .request
                        .filters
                        .get(&column.field)
                        .and_then(|values| values.iter().next().cloned()),
                    column: column.clone(),
                }
            }

            if !snapshot.request.filters.is_empty() {
                button {
                    style: "{button_style()}",
                    onclick: {
                        let view = view.clone();
                        move |_| {
                            let engine = view.engine().clone();
                            spawn(async move {
                                engine.clear_filters().await;
                            });
                        }
                    },
                    "Clear filters"
                }
            }

            button {
                style: "{button_style()}",
                disabled: busy,
                onclick: {
                    let view = view.clone();
                    move |_| {
                        let engine = view.engine().clone();
                        spawn(async move {
                            engine.refresh().await;
                        });
                    }
                },
                "Refresh"
            }

            button {
                style: "{button_style()}",
                disabled: rows.is_empty(),
                onclick: {
                    let view = view.clone();
                    let rows = rows.clone();
                    move |_| export_page(&view, entity, page, &rows)
                },
                "Export CSV"
            }
        }

        div { style: "{table_container_style()}",
            table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                thead {
                    tr {
                        for column in columns.iter().cloned() {
                            th {
                                style: "{table_header_cell_style(column.sortable)}",
                                onclick: {
                                    let view = view.clone();
                                    let column = column.clone();
                                    let current_sort = current_sort.clone();
                                    move |_| toggle_sort(&view, &column, current_sort.as_ref())
                                },
                                "{column.title}{sort_marker(&column, current_sort.as_ref())}"
                            }
                        }
                        if can_delete {
                            th { style: "{table_header_cell_style(false)}", "" }
                        }
                    }
                }
                tbody {
                    for (row_idx, row) in rows.iter().cloned().enumerate() {
                        tr { key: "{row.row_id().unwrap_or_else(|| row_idx.to_string())}",
                            for column in columns.iter() {
                                td { style: "{table_cell_style()}", "{row.cell_text(&column.field)}" }
                            }
                            if can_delete {
                                td { style: "{table_cell_style()}",
                                    button {
                                        style: "{button_style()}",
                                        disabled: busy || row.row_id().is_none(),
                                        onclick: {
                                            let view = view.clone();
                                            let row = row.clone();
                                            move |_| delete_row(&view, entity, &row)
                                        },
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }
            if snapshot.status == TableStatus::Loaded && rows.is_empty() {
                p { style: "padding: 12px; color: #666;", "No results" }
            }
        }

        div { style: "display: flex; gap: 8px; align-items: center; margin-top: 12px;",
            button {
                style: "{button_style()}",
                disabled: busy || page <= 1,
                onclick: {
                    let view = view.clone();
                    move |_| {
                        let engine = view.engine().clone();
                        spawn(async move {
                            engine.set_page(page.saturating_sub(1)).await;
                        });
                    }
                },
                "Previous"
            }
            button {
                style: "{button_style()}",
                disabled: busy || page >= total_pages,
                onclick: {
                    let view = view.clone();
                    move |_| {
                        let engine = view.engine().clone();
                        spawn(async move {
                            engine.set_page(page + 1).await;
                        });
                    }
                },
                "Next"
            }
            span { "Page {page} / {total_pages.max(1)} · {total} total" }
            select {
                value: "{snapshot.request.size}",
                onchange: {
                    let view = view.clone();
                    move |event: FormEvent| {
                        let Ok(size) = event.value().parse::<u32>() else {
                            return;
                        };
                        let view = view.clone();
                        spawn(async move {
                            if let Err(err) = view.engine().set_page_size(size).await {
                                let mut notice = view.notice;
                                notice.set(err.to_string());
                            }
                        });
                    }
                },
                for size in PAGE_SIZE_CHOICES {
                    option { value: "{size}", selected: size == snapshot.request.size, "{size} / page" }
                }
            }
        }

        p { style: "margin-top: 8px; color: #444;", "{status_line}" }
    }
}

#[component]
fn FilterSelect(
    view: TableView,
    column: ColumnDescriptor,
    #[props(!optional)] selected: Option<String>,
) -> Element {
    let options = column.filter_options.clone().unwrap_or_default();
    let field = column.field.clone();

    rsx! {
        label { style: "display: inline-flex; align-items: center; gap: 6px;",
            span { "{column.title}" }
            select {
                onchange: move |event: FormEvent| {
                    let value = event.value();
                    let values: Vec<String> = if value == ALL_OPTION_VALUE {
                        Vec::new()
                    } else {
                        vec![value]
                    };
                    let view = view.clone();
                    let field = field.clone();
                    spawn(async move {
                        if let Err(err) = view.engine().set_filter(&field, values).await {
                            let mut notice = view.notice;
                            notice.set(err.to_string());
                        }
                    });
                },
                option { value: ALL_OPTION_VALUE, selected: selected.is_none(), "All" }
                for choice in options {
                    option {
                        value: "{choice.value}",
                        selected: selected.as_deref() == Some(choice.value.as_str()),
                        "{choice.label}"
                    }
                }
            }
        }
    }
}

fn submit_search(view: &TableView) {
    let term = view.search_input.read().clone();
    let view = view.clone();
    spawn(async move {
        if let Err(err) = view.engine().set_search(term).await {
            let mut notice = view.notice;
            notice.set(err.to_string());
        }
    });
}

fn toggle_sort(view: &TableView, column: &ColumnDescriptor, current: Option<&SortSpec>) {
    if !column.sortable {
        return;
    }
    let direction = match current {
        Some(sort) if sort.field == column.field => sort.direction.toggled(),
        _ => SortDirection::Asc,
    };
    let view = view.clone();
    let field = column.field.clone();
    spawn(async move {
        if let Err(err) = view.engine().set_sort(&field, direction).await {
            let mut notice = view.notice;
            notice.set(err.to_string());
        }
    });
}

fn sort_marker(column: &ColumnDescriptor, current: Option<&SortSpec>) -> &'static str {
    match current {
        Some(sort) if sort.field == column.field => match sort.direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        },
        _ => "",
    }
}

fn delete_row(view: &TableView, entity: EntityKind, row: &Record) {
    let Some(id) = row.row_id() else {
        return;
    };
    let confirm = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(format!("Delete from {entity}"))
        .set_description(format!("Delete record {id}? This cannot be undone."))
        .set_buttons(MessageButtons::YesNo)
        .show();
    if confirm != MessageDialogResult::Yes {
        return;
    }

    let view = view.clone();
    spawn(async move {
        let mut notice = view.notice;
        match view.coordinator.delete(&id).await {
            Ok(()) => notice.set(format!("Deleted {id}")),
            Err(err) => notice.set(format!("Delete failed: {err}")),
        }
    });
}

fn export_page(view: &TableView, entity: EntityKind, page: u32, rows: &[Record]) {
    let mut notice = view.notice;
    let file_name = default_export_file_name(entity.key(), page, chrono::Local::now().naive_local());
    let mut dialog = FileDialog::new()
        .add_filter("CSV", &["csv"])
        .set_file_name(file_name.as_str());
    if let Ok(dir) = default_export_dir() {
        dialog = dialog.set_directory(dir);
    }
    let Some(path) = dialog.save_file() else {
        return;
    };

    let registry = view.engine().registry();
    match export_rows_to_path(&registry, rows, &path) {
        Ok(written) => notice.set(format!("Exported {written} rows to {}", path.display())),
        Err(err) => notice.set(format!("Export failed: {err:#}")),
    }
}

fn status_line(snapshot: &TableSnapshot<Record>, notice: &str) -> String {
    let state = match snapshot.status {
        TableStatus::Idle => "Idle".to_string(),
        TableStatus::Loading => "Loading…".to_string(),
        TableStatus::Loaded => "Ready".to_string(),
        TableStatus::Failed => match &snapshot.error {
            Some(err) if err.is_unauthorized() => {
                format!("Signed out or not allowed: {err}")
            }
            Some(err) => format!("Failed: {err}"),
            None => "Failed".to_string(),
        },
    };
    let mut parts = vec![state];
    if let Some(err) = &snapshot.validation_error {
        parts.push(err.to_string());
    }
    if let Some(err) = &snapshot.mutation_error {
        parts.push(err.to_string());
    }
    if !notice.is_empty() {
        parts.push(notice.to_string());
    }
    parts.join(" · ")
}
