//! Result rendering for the Front-end Adapter (component E): a pretty
//! aligned block or raw JSON, matching the two `-j`-toggled output shapes
//! every read command supports.

use colored::*;
use serde_json::Value;

use crate::record::KeyRecord;

/// Render a single record as an aligned `field: value` block, the same
/// shape the original's `_prettify_dict` produces.
pub fn render_pretty_record(record: &KeyRecord) -> String {
    let rows: Vec<(&str, String)> = vec![
        ("name", record.name.clone()),
        ("value", pretty_value(&record.value)),
        ("description", record.description.clone().unwrap_or_else(|| "null".to_string())),
        ("metadata", pretty_metadata(&record.metadata)),
        ("uid", record.uid.clone()),
        ("created_at", record.created_at.clone()),
        ("modified_at", record.modified_at.clone()),
    ];
    render_aligned(&rows)
}

/// Render a list of key names, one per line, matching `_prettify_list`.
pub fn render_pretty_list(names: &[String]) -> String {
    if names.is_empty() {
        return "The stash is empty".to_string();
    }
    names
        .iter()
        .map(|n| format!("- {}", n.cyan()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_aligned(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| format!("{:width$}", k, width = width).bold().to_string() + ": " + v)
        .collect::<Vec<_>>()
        .join("\n")
}

fn pretty_value(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={}", v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())))
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty_metadata(metadata: &Option<std::collections::BTreeMap<String, String>>) -> String {
    match metadata {
        None => "null".to_string(),
        Some(map) if map.is_empty() => "null".to_string(),
        Some(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Render a record as JSON text.
pub fn render_json_record(record: &KeyRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
}

/// Render a key-name list as a JSON array.
pub fn render_json_list(names: &[String]) -> String {
    serde_json::to_string_pretty(names).unwrap_or_else(|_| "[]".to_string())
}
