use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::data::model::{CollectionScan, LayoutKind};

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

/// A collection's rows, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub collection: String,
    pub layout: LayoutKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Column headers for a collection. The package column carries the
/// collection name, e.g. `MPI Packages`.
pub fn headers(collection: &str, layout: LayoutKind) -> Vec<String> {
    let packages = format!("{collection} Packages");
    let context: &[&str] = match layout {
        LayoutKind::Flat => &[],
        LayoutKind::Mpi => &["MPI Ver.", "Compiler"],
        LayoutKind::Python => &["Python Version"],
        LayoutKind::Compiler => &["Compiler Version"],
    };
    context
        .iter()
        .map(|h| h.to_string())
        .chain([packages, "Dependency".to_string()])
        .collect()
}

/// Flatten a scan into a report, group order preserved.
/// `None` when there is nothing to show.
pub fn assemble(scan: CollectionScan) -> Option<Report> {
    if scan.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = scan
        .groups
        .iter()
        .flatten()
        .map(|record| record.to_row())
        .collect();

    let collection = scan.collection;
    Some(Report {
        headers: headers(&collection.name, collection.layout),
        layout: collection.layout,
        collection: collection.name,
        rows,
    })
}

/// Line printed in place of a report for a collection with no rows.
pub fn empty_message(collection: &str) -> String {
    format!("0 software found for {collection}")
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text table
    #[default]
    Table,
    /// Comma separated values, one header record per collection
    Csv,
    /// One JSON object per collection per line
    Json,
}

/// Write one collection's outcome: its report, or the count-zero line.
pub fn write_collection(
    out: &mut impl Write,
    format: OutputFormat,
    collection: &str,
    report: Option<&Report>,
) -> Result<()> {
    let Some(report) = report else {
        writeln!(out, "{}", empty_message(collection))?;
        return Ok(());
    };

    match format {
        OutputFormat::Table => {
            writeln!(out)?;
            out.write_all(render_table(&report.headers, &report.rows).as_bytes())?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            writer.write_record(&report.headers)?;
            for row in &report.rows {
                writer.write_record(row)?;
            }
            writer.flush().context("writing CSV")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, report).context("writing JSON")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// `simple`-style table: header, dash rule, rows. Columns are left-aligned
/// and separated by two spaces.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let mut text = String::new();
    let lines = std::iter::once(headers)
        .chain([rule.as_slice()])
        .chain(rows.iter().map(Vec::as_slice));
    for line in lines {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = line.get(i).map_or("", String::as_str);
                format!("{cell:<w$}")
            })
            .collect();
        text.push_str(cells.join("  ").trim_end());
        text.push('\n');
    }
    text
}
