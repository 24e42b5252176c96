//! `vitamins crumb` / `vitamins send` — add to a tracker and save it.

use vitamins_core::{Metadata, MetadataValue, RawError, Tracker};

use super::print_json;

/// Parse `key=value` pairs; numbers and booleans keep their type.
pub fn parse_metadata(pairs: &[String]) -> Result<Option<Metadata>, String> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut meta = Metadata::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid metadata '{}', expected key=value", pair))?;
        let value = if let Ok(b) = raw.parse::<bool>() {
            MetadataValue::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            MetadataValue::Integer(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            MetadataValue::from(f)
        } else {
            MetadataValue::Text(raw.to_string())
        };
        meta.insert(key.to_string(), value);
    }
    Ok(Some(meta))
}

pub fn crumb(
    tracker: &mut Tracker,
    message: &str,
    category: &str,
    metadata: &[String],
) -> Result<(), String> {
    let metadata = parse_metadata(metadata)?;
    tracker.crumb(message, category, metadata);
    tracker.handle_session_end();
    println!("Recorded crumb ({} in trail)", tracker.trail().len());
    Ok(())
}

pub fn send(
    tracker: &mut Tracker,
    message: &str,
    name: &str,
    status: Option<u16>,
    tags: &[String],
) -> Result<(), String> {
    let mut error = RawError::named(name, message);
    if let Some(status) = status {
        error = error.with_status(status);
    }
    let tags: Vec<&str> = tags.iter().map(String::as_str).collect();

    let node = tracker.send(&error, &tags);
    tracker.handle_session_end();

    let value = serde_json::to_value(&node).map_err(|e| e.to_string())?;
    print_json(&value);
    Ok(())
}
