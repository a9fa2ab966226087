// ── File export ──
//
// Writes an in-memory collection to `{name}.{ext}` as pretty JSON or CSV.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::CoreError;

/// On-disk export format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Render `data` in the requested format.
///
/// For CSV, `data` may be an array of objects or a document the server
/// already rendered as a string, which passes through untouched.
pub fn render_export(data: &Value, format: ExportFormat) -> Result<String, CoreError> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(data)
            .map_err(|e| CoreError::Internal(format!("JSON encoding failed: {e}"))),
        ExportFormat::Csv => match data {
            Value::String(doc) => Ok(doc.clone()),
            Value::Array(records) => Ok(to_csv(records)),
            other => Err(CoreError::validation(format!(
                "cannot export a JSON {} as CSV",
                json_kind(other)
            ))),
        },
    }
}

/// Render `data` and write it to `dir/{name}.{ext}`, returning the path.
pub fn export_to_file(
    dir: &Path,
    name: &str,
    format: ExportFormat,
    data: &Value,
) -> Result<PathBuf, CoreError> {
    let content = render_export(data, format)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.{}", format.extension()));
    std::fs::write(&path, content)?;
    info!(path = %path.display(), %format, "export written");
    Ok(path)
}

/// CSV with a header row taken from the first record's keys.
///
/// Records missing a column get an empty cell. Cells containing a comma,
/// quote, or line break are quoted with inner quotes doubled.
pub fn to_csv(records: &[Value]) -> String {
    let Some(Value::Object(first)) = records.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| escape_cell(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        let row = headers
            .iter()
            .map(|h| escape_cell(&cell_text(record.get(h.as_str()))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_owned()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn csv_header_follows_first_record() {
        let data = vec![
            json!({ "domain": "a.com", "count": 3, "blocked": true }),
            json!({ "domain": "b.com", "count": 1, "blocked": false }),
        ];
        assert_eq!(
            to_csv(&data),
            "domain,count,blocked\na.com,3,true\nb.com,1,false"
        );
    }

    #[test]
    fn csv_quotes_commas_quotes_and_newlines() {
        let data = vec![json!({
            "notes": "ads, trackers",
            "quote": "say \"hi\"",
            "multi": "line1\nline2",
            "missing": null
        })];
        assert_eq!(
            to_csv(&data),
            "notes,quote,multi,missing\n\"ads, trackers\",\"say \"\"hi\"\"\",\"line1\nline2\","
        );
    }

    #[test]
    fn csv_of_nothing_is_empty() {
        assert_eq!(to_csv(&[]), "");
    }

    #[test]
    fn prerendered_csv_passes_through() {
        let doc = json!("id,domain\r\n1,a.com\r\n");
        assert_eq!(
            render_export(&doc, ExportFormat::Csv).unwrap(),
            "id,domain\r\n1,a.com\r\n"
        );
    }

    #[test]
    fn export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = json!([{ "domain": "a.com" }]);

        let path = export_to_file(dir.path(), "blacklist", ExportFormat::Json, &data).unwrap();

        assert_eq!(path, dir.path().join("blacklist.json"));
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::Json.to_string(), "json");
    }
}
