//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use mihoctl_core::LatencyOutcome;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Latency cell: green under 200ms, yellow under 500ms, red above or on
/// failure.
pub fn latency_cell(outcome: Option<&LatencyOutcome>, color: bool) -> String {
    let Some(outcome) = outcome else {
        return "-".into();
    };
    let text = outcome.to_string();
    if !color {
        return text;
    }
    match outcome.millis() {
        Some(ms) if ms < 200 => text.green().to_string(),
        Some(ms) if ms < 500 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// Check mark for the selected member of a group.
pub fn selected_mark(selected: bool, color: bool) -> String {
    match (selected, color) {
        (false, _) => String::new(),
        (true, true) => "✓".green().to_string(),
        (true, false) => "✓".into(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item views don't use the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
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

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_default()
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_cell_without_color() {
        assert_eq!(latency_cell(None, false), "-");
        assert_eq!(latency_cell(Some(&LatencyOutcome::Millis(87)), false), "87ms");
        assert_eq!(
            latency_cell(Some(&LatencyOutcome::Failed("Timeout".into())), false),
            "failed"
        );
    }

    #[test]
    fn plain_list_is_one_id_per_line() {
        #[derive(serde::Serialize, Tabled)]
        struct Row {
            name: String,
        }
        let rows = vec![Row { name: "a".into() }, Row { name: "b".into() }];
        let out = render_list(&OutputFormat::Plain, &rows, |r| Row { name: r.name.clone() }, |r| {
            r.name.clone()
        });
        assert_eq!(out, "a\nb");
    }
}
