//! Output formatting utilities

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// A record printable as one table row
pub trait TableRow {
    fn header() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Left-aligned columns separated by two spaces
pub fn render_table<T: TableRow>(rows: &[T]) -> String {
    let header = T::header();
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |row: &[String]| {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    push_row(header.as_slice());
    for row in &cells {
        push_row(row.as_slice());
    }
    out
}

/// Format output based on format type
pub fn format_output<T: Serialize + TableRow>(rows: &[T], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Table => render_table(rows),
    }
}

/// Print rows to stdout
pub fn print_output<T: Serialize + TableRow>(rows: &[T], format: OutputFormat) {
    println!("{}", format_output(rows, format).trim_end());
}
