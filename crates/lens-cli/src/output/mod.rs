use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// Arrays of objects become one row per element; an object becomes
/// key/value rows; anything else a single cell.
fn render_table(value: &Value) -> anyhow::Result<String> {
    let options = table_options();
    let table = match value {
        Value::Array(items) if items.is_empty() => return Ok("(no rows)".to_string()),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut headers: Vec<String> = Vec::new();
            for map in items.iter().filter_map(Value::as_object) {
                for key in map.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(h).map_or_else(|| "-".to_string(), cell))
                        .collect()
                })
                .collect();
            table::Table::new(headers, rows)
        }
        Value::Array(items) => table::Table::new(
            vec!["value".to_string()],
            items.iter().map(|item| vec![cell(item)]).collect(),
        ),
        Value::Object(map) => table::Table::new(
            vec!["key".to_string(), "value".to_string()],
            map.iter().map(|(k, v)| vec![k.clone(), cell(v)]).collect(),
        ),
        scalar => table::Table::new(vec!["value".to_string()], vec![vec![cell(scalar)]]),
    };
    Ok(table.render(options))
}

/// One-line cell text. Nested values are shown as compact JSON and newlines
/// are flattened so analyzer text does not break rows.
fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| "<invalid-json>".to_string()),
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::{cell, render};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Row {
        id: &'static str,
        stage_type: &'static str,
        summary: Option<&'static str>,
    }

    #[test]
    fn raw_is_single_line_json() {
        let out = render(
            &Row {
                id: "res-1",
                stage_type: "overview",
                summary: None,
            },
            OutputFormat::Raw,
        )
        .unwrap();
        assert!(!out.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["id"], "res-1");
    }

    #[test]
    fn table_of_rows_keeps_field_order() {
        let rows = vec![
            Row {
                id: "res-1",
                stage_type: "overview",
                summary: None,
            },
            Row {
                id: "res-2",
                stage_type: "students-1",
                summary: Some("ok"),
            },
        ];
        let out = render(&rows, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        let id_at = lines[0].find("id").unwrap();
        let stage_at = lines[0].find("stage_type").unwrap();
        assert!(id_at < stage_at);
        assert!(lines[2].contains("res-1") && lines[2].contains('-'));
    }

    #[test]
    fn empty_array_has_placeholder() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(render(&rows, OutputFormat::Table).unwrap(), "(no rows)");
    }

    #[test]
    fn cells_flatten_multiline_text() {
        let value = serde_json::json!("## Overview\n\nCohesive   class");
        assert_eq!(cell(&value), "## Overview Cohesive class");
    }
}
