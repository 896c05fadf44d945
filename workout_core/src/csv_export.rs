//! CSV export of the session history.
//!
//! One row per (entry, exercise). Hidden entries are exported too, with
//! `visible = false`, so the file mirrors what analytics sees.

use crate::{HistoryEntry, HistoryLog, Result};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    entry_id: String,
    plan_id: String,
    date: String,
    weekdays: String,
    exercise: &'a str,
    weight_kg: Option<f64>,
    visible: bool,
}

fn rows(entry: &HistoryEntry) -> impl Iterator<Item = CsvRow<'_>> {
    let date = entry.date.format("%d-%m-%Y").to_string();
    let weekdays = entry
        .weekdays
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    entry.weights.iter().map(move |(exercise, weight)| CsvRow {
        entry_id: entry.id.to_string(),
        plan_id: entry.plan_id.to_string(),
        date: date.clone(),
        weekdays: weekdays.clone(),
        exercise,
        weight_kg: *weight,
        visible: entry.visible,
    })
}

/// Write the whole log as CSV, returning the number of rows
pub fn write_history<W: Write>(history: &HistoryLog, out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut count = 0;
    for entry in history.all() {
        for row in rows(entry) {
            writer.serialize(row)?;
            count += 1;
        }
    }
    writer.flush()?;
    Ok(count)
}

/// Export the log to a file, replacing any previous export
pub fn export_history(history: &HistoryLog, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(csv_path)?;
    let count = write_history(history, &file)?;
    file.sync_all()?;

    tracing::info!(
        "Exported {} rows from {} history entries to {:?}",
        count,
        history.len(),
        csv_path
    );
    Ok(count)
}
