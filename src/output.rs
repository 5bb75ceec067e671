use crate::error::Result;
use crate::reports::ReportView;
use crate::types::DisplayRow;
use log::info;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path.as_ref(), s)?;
    info!("Wrote {}", path.as_ref().display());
    Ok(())
}

/// Every row of a view, formatted, across all pages.
pub fn display_rows(view: &ReportView) -> Vec<DisplayRow> {
    view.rows
        .iter()
        .enumerate()
        .map(|(i, row)| DisplayRow::from_row(i + 1, row))
        .collect()
}

/// Markdown rendering of up to `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_view(title: &str, view: &ReportView, max_rows: usize) {
    println!("{}", title);
    println!("({})\n", view.period_label);
    println!("{}\n", render_table(&view.page.items, max_rows));
    println!(
        "Page {} of {} ({} rows)",
        view.page.page, view.page.total_pages, view.page.total_items
    );
    println!("{}\n", render_table(&[DisplayRow::from_row(0, &view.total)], 1));
}
