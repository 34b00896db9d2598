//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders snapshots in the format selected by `--output`. Table uses
//! `tabled`, structured formats use serde, plain emits tab-delimited
//! lines in the same shape as the text feed.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use sunflow_core::{Reading, ReadingKind, Snapshot};

use crate::cli::OutputFormat;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "KIND")]
    kind: String,
}

impl From<&Reading> for ReadingRow {
    fn from(reading: &Reading) -> Self {
        let kind = ReadingKind::classify(&reading.display_name, reading.unit.as_deref());
        Self {
            id: reading.id.clone(),
            name: reading.display_name.clone(),
            value: reading.value.to_string(),
            unit: reading.unit.clone().unwrap_or_default(),
            kind: kind.to_string(),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a full snapshot in the chosen format.
pub fn render_snapshot(format: &OutputFormat, snapshot: &Snapshot) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ReadingRow> = snapshot.iter().map(ReadingRow::from).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(snapshot, false),
        OutputFormat::JsonCompact => render_json(snapshot, true),
        OutputFormat::Yaml => render_yaml(snapshot),
        OutputFormat::Plain => snapshot
            .iter()
            .map(|r| match &r.unit {
                Some(unit) => format!("{}\t{}\t{unit}", r.id, r.value),
                None => format!("{}\t{}", r.id, r.value),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a single reading in the chosen format.
///
/// Plain emits the bare value, so `-o plain --id grid_power` is
/// directly usable in scripts.
pub fn render_reading(format: &OutputFormat, reading: &Reading) -> String {
    match format {
        OutputFormat::Table => render_table(&[ReadingRow::from(reading)]),
        OutputFormat::Json => render_json(reading, false),
        OutputFormat::JsonCompact => render_json(reading, true),
        OutputFormat::Yaml => render_yaml(reading),
        OutputFormat::Plain => reading.value.to_string(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.expect("serialization should not fail")
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
