use serde_json::{Map, Value};

/// Splits delimited text into raw records. The first non-empty line is the
/// header row; data rows are zero-padded or truncated to the header length.
///
/// Quoting is deliberately naive: one leading/trailing quote is stripped per
/// cell, and delimiters inside quotes are not supported. This importer is
/// scoped to simple, unquoted CSV.
pub fn parse_delimited(text: &str, delimiter: char) -> Vec<Map<String, Value>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = match lines.next() {
        Some(line) => split_row(line, delimiter),
        None => return Vec::new(),
    };

    lines
        .map(|line| {
            let mut cells = split_row(line, delimiter);
            // Pads short rows, truncates long ones.
            cells.resize(header.len(), String::new());
            header
                .iter()
                .cloned()
                .zip(cells)
                .map(|(key, cell)| (key, Value::String(cell)))
                .collect()
        })
        .collect()
}

fn split_row(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(strip_quotes).collect()
}

fn strip_quotes(cell: &str) -> String {
    let trimmed = cell.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Accepts a bare JSON array of records or a `{"rows": [...]}` envelope.
/// Non-object rows are dropped.
pub fn parse_json(text: &str) -> Result<Vec<Map<String, Value>>, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON import: {}", e))?;

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => match envelope.remove("rows") {
            Some(Value::Array(rows)) => rows,
            _ => return Err("Expected a JSON array or a {\"rows\": [...]} envelope".to_string()),
        },
        _ => return Err("Expected a JSON array or a {\"rows\": [...]} envelope".to_string()),
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect())
}
