//! Embedded payload detection and parsing.
//!
//! Two payload shapes are supported: a whole JSON blob inside a known
//! container element, and fragmented/streamed payloads emitted as repeated
//! push-style script calls. Fragments are reassembled into one synthetic
//! root object before article search runs.

use serde_json::{Map, Value};

use crate::dom::{self, Document, Selection};
use crate::options::Heuristics;
use crate::patterns;

/// True when the document carries any recognizable embedded payload.
#[must_use]
pub fn has_payload(doc: &Document) -> bool {
    for id in patterns::PAYLOAD_CONTAINER_IDS {
        if !doc.select(&format!("script#{id}")).is_empty() {
            return true;
        }
    }
    script_texts(doc)
        .iter()
        .any(|text| text.contains(patterns::STREAM_MARKER))
}

/// Locate and parse the document's embedded payload, if any.
///
/// Whole-blob containers are probed first; a blob over the byte ceiling is
/// rejected so extraction falls through to other strategies. Streamed
/// fragments are tried second.
#[must_use]
pub fn find_payload(doc: &Document, heuristics: &Heuristics) -> Option<Value> {
    for id in patterns::PAYLOAD_CONTAINER_IDS {
        let container = doc.select(&format!("script#{id}"));
        if container.is_empty() {
            continue;
        }
        let text = dom::text_content(&container).to_string();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if text.len() > heuristics.max_payload_bytes {
            log::debug!(
                "payload container #{id} over byte ceiling ({} > {})",
                text.len(),
                heuristics.max_payload_bytes
            );
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => return Some(value),
            Err(err) => log::debug!("payload container #{id} did not parse: {err}"),
        }
    }

    collect_stream_fragments(doc)
}

fn script_texts(doc: &Document) -> Vec<String> {
    doc.select("script")
        .nodes()
        .iter()
        .map(|node| Selection::from(*node).text().to_string())
        .collect()
}

/// Reassemble streamed push-call fragments into one synthetic root.
///
/// Each push call carries a string argument encoding one or more
/// newline-separated `index:payload` records. A record payload may be a
/// plain object or a 4-element array whose index-3 element (or the first
/// non-empty object found by scanning) is the actual data object.
#[must_use]
pub fn collect_stream_fragments(doc: &Document) -> Option<Value> {
    let mut fragments = Vec::new();

    for text in script_texts(doc) {
        if !text.contains(patterns::STREAM_MARKER) {
            continue;
        }
        for caps in patterns::STREAM_PUSH_CALL.captures_iter(&text) {
            let Some(encoded) = caps.get(1) else { continue };
            let Some(decoded) = decode_js_string(encoded.as_str()) else {
                continue;
            };
            for record in decoded.split('\n') {
                if let Some(value) = parse_fragment_record(record) {
                    fragments.push(value);
                }
            }
        }
    }

    if fragments.is_empty() {
        return None;
    }

    let mut root = Map::new();
    root.insert("fragments".to_string(), Value::Array(fragments));
    Some(Value::Object(root))
}

/// Decode the captured JS string literal body back into its text value.
fn decode_js_string(escaped: &str) -> Option<String> {
    serde_json::from_str::<String>(&format!("\"{escaped}\"")).ok()
}

/// Parse one `index:payload` record into its data object.
fn parse_fragment_record(record: &str) -> Option<Value> {
    let record = record.trim();
    if record.is_empty() {
        return None;
    }

    // Records are `index:payload`; a record may also be bare JSON.
    let payload = match record.split_once(':') {
        Some((index, rest)) if index.len() <= 4 && index.chars().all(|c| c.is_ascii_alphanumeric()) => {
            rest
        }
        _ => record,
    };

    let value = serde_json::from_str::<Value>(payload).ok()?;
    Some(unwrap_fragment(value))
}

/// Unwrap the 4-element array convention around fragment data objects.
fn unwrap_fragment(value: Value) -> Value {
    if let Value::Array(items) = &value {
        if items.len() == 4 {
            if let Some(obj @ Value::Object(map)) = items.get(3) {
                if !map.is_empty() {
                    return obj.clone();
                }
            }
            if let Some(found) = items.iter().find(|v| {
                matches!(v, Value::Object(map) if !map.is_empty())
            }) {
                return found.clone();
            }
        }
    }
    value
}
