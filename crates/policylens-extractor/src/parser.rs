//! Parse LLM output into entity candidates
//!
//! Model output is free text that usually, but not always, contains a JSON
//! array. Parsing is best-effort and reports [`ExtractorError::ParseFailure`]
//! when no array can be recovered, so callers decide whether to degrade.

use crate::error::ExtractorError;
use crate::types::EntityCandidate;
use serde_json::Value;
use tracing::debug;

/// Parse an LLM response into entity candidates
///
/// Accepted shapes, tried in order:
/// - the whole (fence-stripped) response is a JSON array
/// - the whole response is an object with an `entities` array
/// - the first bracketed substring, shortest match first, then longest
///
/// Array entries may be strings or objects with `text`/`name`,
/// `label`/`type`, `confidence`, and `aliases`. Other entries are skipped.
pub fn parse_entity_response(response: &str) -> Result<Vec<EntityCandidate>, ExtractorError> {
    let body = strip_code_fence(response);
    let items = locate_array(body).ok_or_else(|| {
        ExtractorError::ParseFailure(format!(
            "no JSON array found in response of {} chars",
            response.chars().count()
        ))
    })?;

    let candidates: Vec<EntityCandidate> = items.iter().filter_map(parse_entry).collect();
    debug!(
        "Parsed {} candidates from {} array entries",
        candidates.len(),
        items.len()
    );
    Ok(candidates)
}

/// Return the content of the first fenced code block, or the trimmed input
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_fence = &trimmed[start + 3..];
    // Skip the language tag line
    let content_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let content = &after_fence[content_start..];
    match content.find("```") {
        Some(end) => content[..end].trim(),
        None => content.trim(),
    }
}

fn locate_array(body: &str) -> Option<Vec<Value>> {
    if body.starts_with('[') && body.ends_with(']') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) {
            return Some(items);
        }
    }

    if body.starts_with('{') {
        if let Some(items) = unwrap_entities_object(body) {
            return Some(items);
        }
    }

    let open = body.find('[')?;
    let shortest = body[open..].find(']').map(|i| &body[open..=open + i]);
    let longest = body.rfind(']').filter(|&i| i > open).map(|i| &body[open..=i]);

    for slice in [shortest, longest].into_iter().flatten() {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(slice) {
            return Some(items);
        }
    }

    // An object wrapper surrounded by prose
    let brace = body.find('{')?;
    let end = body.rfind('}')?;
    if end > brace {
        return unwrap_entities_object(&body[brace..=end]);
    }
    None
}

fn unwrap_entities_object(body: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(mut map) => match map.remove("entities")? {
            Value::Array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn parse_entry(entry: &Value) -> Option<EntityCandidate> {
    match entry {
        Value::String(name) => Some(EntityCandidate::named(name.trim())),
        Value::Object(obj) => {
            let name = obj
                .get("text")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)?
                .trim()
                .to_string();
            let label = obj
                .get("label")
                .or_else(|| obj.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let confidence = obj.get("confidence").and_then(Value::as_f64);
            let aliases = obj
                .get("aliases")
                .and_then(Value::as_array)
                .map(|a| {
                    a.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(EntityCandidate {
                name,
                label,
                confidence,
                aliases,
            })
        }
        _ => None,
    }
}
