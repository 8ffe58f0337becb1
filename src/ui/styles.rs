pub fn table_container_style() -> &'static str {
    "overflow: auto; max-height: calc(100vh - 220px); border: 1px solid #ddd; border-radius: 8px;"
}

pub fn table_header_cell_style(sortable: bool) -> String {
    format!(
        "position: sticky; top: 0; background: #f5f6f8; border-bottom: 1px solid #ddd; padding: 6px 10px; text-align: left; white-space: nowrap;{}",
        if sortable { " cursor: pointer;" } else { "" }
    )
}

pub fn table_cell_style() -> &'static str {
    "border-bottom: 1px solid #eee; padding: 6px 10px; white-space: nowrap;"
}

pub fn button_style() -> &'static str {
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;"
}

pub fn nav_item_style(active: bool) -> String {
    format!(
        "display: block; width: 100%; text-align: left; padding: 8px 12px; border: none; border-radius: 6px; cursor: pointer; background: {};",
        if active { "#eef4ff" } else { "transparent" }
    )
}
