use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{HubError, Result};
use crate::models::Message;

/// Accepts the bare array or the paged `{ "items": [...] }` wrapper the
/// backend list call returns. Records are decoded one by one so a bad record
/// is reported by position and id.
pub fn parse_snapshot(contents: &str) -> Result<Vec<Message>> {
    let document: Value = serde_json::from_str(contents)?;
    let records = match document {
        Value::Object(mut fields) if fields.contains_key("items") => {
            fields.remove("items").unwrap_or_default()
        }
        other => other,
    };
    let records: Vec<Value> = serde_json::from_value(records)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            serde_json::from_value(record).map_err(|source| HubError::InvalidRecord {
                index,
                id,
                source,
            })
        })
        .collect()
}

pub fn load_snapshot(path: &Path) -> Result<Vec<Message>> {
    let contents = fs::read_to_string(path).map_err(|e| HubError::io(path, e))?;
    let messages = parse_snapshot(&contents)?;
    log::info!("loaded {} messages from {}", messages.len(), path.display());
    Ok(messages)
}
