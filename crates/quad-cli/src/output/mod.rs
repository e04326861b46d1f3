use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
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

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(_) => {
            let headers = [String::from("key"), String::from("value")];
            let mut entries = Vec::new();
            flatten(None, &value, &mut entries);
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render(&headers, &rows, table_options()))
        }
        scalar => {
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render(&[String::from("value")], &rows, table_options()))
        }
    }
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render(&[String::from("value")], &rows, table_options());
    }

    let flattened = items
        .iter()
        .map(|item| {
            let mut entries = Vec::new();
            flatten(None, item, &mut entries);
            entries
        })
        .collect::<Vec<_>>();

    let mut headers = Vec::<String>::new();
    for entries in &flattened {
        for (key, _) in entries {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    headers.sort();
    // Identity columns lead.
    let mut next = 0;
    for lead in ["id", "name"] {
        if let Some(pos) = headers.iter().position(|h| h == lead) {
            let header = headers.remove(pos);
            headers.insert(next, header);
            next += 1;
        }
    }

    let rows = flattened
        .iter()
        .map(|entries| {
            headers
                .iter()
                .map(|header| {
                    entries
                        .iter()
                        .find(|(key, _)| key == header)
                        .map_or_else(|| String::from("-"), |(_, value)| value_to_cell(value))
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render(&headers, &rows, table_options())
}

/// Flatten nested objects into dotted keys (`viewport.center.lat`).
fn flatten(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, Value)>) {
    match (prefix, value) {
        (_, Value::Object(map)) if !map.is_empty() => {
            for (key, nested) in map {
                let key = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
                flatten(Some(&key), nested, out);
            }
        }
        (Some(key), other) => out.push((key.to_string(), other.clone())),
        (None, other) => out.push((String::from("value"), other.clone())),
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
