//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use pidns_core::ui::TableView;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a page view in the chosen format.
///
/// - `table`: the view's rows through `to_row`, or its placeholder message
/// - `json` / `json-compact` / `yaml`: `data` via serde
/// - `plain`: `id_fn` on each item, one per line
pub fn render_view<T, V, R>(
    format: OutputFormat,
    data: &[T],
    view: &TableView<V>,
    to_row: impl Fn(&V) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => Ok(match view {
            TableView::Rows(rows) => render_table(&rows.iter().map(to_row).collect::<Vec<_>>()),
            TableView::Placeholder(message) => message.clone(),
        }),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views don't use `Tabled`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
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

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Compact single-line JSON.
pub fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

/// YAML output.
pub fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(serde::Serialize)]
    struct Item {
        id: u32,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: 1, name: "ads.example" }, Item { id: 2, name: "track.example" }]
    }

    fn view(items: &[Item]) -> TableView<String> {
        TableView::from_rows(items.iter().map(|i| i.name.to_string()).collect(), "Nothing here")
    }

    #[test]
    fn table_shows_rows_or_placeholder() {
        let data = items();
        let out = render_view(
            OutputFormat::Table,
            &data,
            &view(&data),
            |n| ItemRow { name: n.clone() },
            |i| i.id.to_string(),
        )
        .unwrap();
        assert!(out.contains("track.example"));
        assert!(out.contains("Name"));

        let out = render_view(
            OutputFormat::Table,
            &[] as &[Item],
            &view(&[]),
            |n| ItemRow { name: n.clone() },
            |i| i.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, "Nothing here");
    }

    #[test]
    fn plain_and_json_use_the_data() {
        let data = items();
        let v = view(&data);
        let row = |n: &String| ItemRow { name: n.clone() };

        let plain = render_view(OutputFormat::Plain, &data, &v, row, |i| i.id.to_string()).unwrap();
        assert_eq!(plain, "1\n2");

        let json =
            render_view(OutputFormat::JsonCompact, &data, &v, row, |i| i.id.to_string()).unwrap();
        assert_eq!(
            json,
            r#"[{"id":1,"name":"ads.example"},{"id":2,"name":"track.example"}]"#
        );
    }
}
