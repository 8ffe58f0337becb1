use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::domain::entities::column::ColumnRegistry;
use crate::domain::entities::record::TableRow;

/// Writes the given rows with one column per registry entry, titled as in
/// the table header.
pub fn export_rows<W: Write, R: TableRow>(
    registry: &ColumnRegistry,
    rows: &[R],
    writer: W,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(registry.columns().iter().map(|column| column.title.as_str()))
        .context("failed to write csv header")?;

    for (row_idx, row) in rows.iter().enumerate() {
        writer
            .write_record(
                registry
                    .columns()
                    .iter()
                    .map(|column| row.cell_text(&column.field)),
            )
            .with_context(|| format!("failed to write csv row {row_idx}"))?;
    }

    writer.flush().context("failed to flush csv output")?;
    Ok(rows.len())
}

pub fn export_rows_to_path<R: TableRow>(
    registry: &ColumnRegistry,
    rows: &[R],
    path: &Path,
) -> Result<usize> {
    let file = File::create(path)
        .with_context(|| format!("failed to create csv: {}", path.display()))?;
    let written = export_rows(registry, rows, file)?;
    tracing::info!(path = %path.display(), rows = written, "exported page");
    Ok(written)
}

/// `{entity}-p{page}-{yyyymmdd-HHMM}.csv`
pub fn default_export_file_name(entity: &str, page: u32, at: NaiveDateTime) -> String {
    format!("{entity}-p{page}-{}.csv", at.format("%Y%m%d-%H%M"))
}
