//! JSON-like array encoding.
//!
//! The encoder writes a pretty-printed array of flat objects with a fixed key
//! order. The decoder is not a JSON parser: it splits the array body on the
//! literal `},{`, then each object on `,` and each pair on its first `:`.
//! A `,` inside a string value therefore breaks that object apart, and such
//! values do not round-trip. Escaped line breaks in a title or description
//! are decoded as spaces, since the CSV store keeps one record per line.

use std::collections::HashMap;

use tracing::warn;

use super::{
    fold_line_breaks, format_date, format_datetime, parse_datetime, parse_id, parse_optional_date,
    Codec, Decoded, SkippedRecord,
};
use crate::error::DecodeRecordError;
use crate::fields::{Priority, Status};
use crate::task::{has_line_break, Task};

const OBJECT_SEPARATOR: &str = "},{";

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, tasks: &[Task]) -> String {
        let mut out = String::from("[\n");
        for (i, task) in tasks.iter().enumerate() {
            out.push_str(&encode_object(task));
            if i + 1 < tasks.len() {
                out.push_str(",\n");
            } else {
                out.push('\n');
            }
        }
        out.push_str("]\n");
        out
    }

    fn decode(&self, text: &str) -> Decoded {
        let mut decoded = Decoded::default();

        for (idx, body) in split_objects(text).iter().enumerate() {
            let fields = split_pairs(body);
            if fields.is_empty() {
                continue;
            }
            match decode_object(&fields) {
                Ok(task) => decoded.tasks.push(task),
                Err(error) => {
                    warn!(object = idx + 1, %error, "skipping malformed JSON object");
                    decoded.skipped.push(SkippedRecord {
                        position: idx + 1,
                        error,
                    });
                }
            }
        }
        decoded
    }
}

fn encode_object(task: &Task) -> String {
    format!(
        "{{\n  \"id\": {},\n  \"title\": \"{}\",\n  \"description\": \"{}\",\n  \"status\": \"{}\",\n  \"priority\": \"{}\",\n  \"deadline\": \"{}\",\n  \"createdAt\": \"{}\",\n  \"updatedAt\": \"{}\"\n}}",
        task.id(),
        escape(task.title()),
        escape(task.description()),
        task.status().wire_name(),
        task.priority().wire_name(),
        task.deadline().map(format_date).unwrap_or_default(),
        format_datetime(task.created_at()),
        format_datetime(task.updated_at()),
    )
}

/// Escape backslash, double quote, newline, carriage return and tab.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse of [`escape`]. Unknown escapes are kept as written.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Cut the array text into object bodies, without their outer braces.
///
/// Lines are joined with no separator first, so `},\n{` becomes `},{`.
pub fn split_objects(text: &str) -> Vec<String> {
    let joined: String = text.lines().collect();
    let content = joined.trim();
    let content = content.strip_prefix('[').unwrap_or(content);
    let content = content.strip_suffix(']').unwrap_or(content).trim();
    if content.is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = content.split(OBJECT_SEPARATOR).collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut body = part.trim();
            if i == 0 {
                body = body.strip_prefix('{').unwrap_or(body);
            }
            if i == last {
                body = body.strip_suffix('}').unwrap_or(body);
            }
            body.to_string()
        })
        .collect()
}

/// Split one object body into key/value pairs.
///
/// Pairs are cut on every `,`; a pair without `:` is ignored. Keys lose all
/// quotes, values lose one surrounding pair and are unescaped.
pub fn split_pairs(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for pair in body.split(',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = key.trim().replace('"', "");
        let key = key.trim();
        let value = value.trim();
        let value = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            &value[1..value.len() - 1]
        } else {
            value
        };
        fields.insert(key.to_string(), unescape(value));
    }
    fields
}

fn decode_object(fields: &HashMap<String, String>) -> Result<Task, DecodeRecordError> {
    let get = |key: &'static str| {
        fields
            .get(key)
            .map(String::as_str)
            .ok_or(DecodeRecordError::MissingField(key))
    };

    let id = parse_id(get("id")?)?;
    let title = single_line(id, "title", get("title")?);
    let description = single_line(id, "description", get("description")?);
    let status: Status = get("status")?
        .parse()
        .map_err(DecodeRecordError::UnknownStatus)?;
    let priority: Priority = get("priority")?
        .parse()
        .map_err(DecodeRecordError::UnknownPriority)?;
    let deadline = match fields.get("deadline").map(String::as_str) {
        None | Some("null") => None,
        Some(s) => parse_optional_date(s)?,
    };
    let created_at = parse_datetime(get("createdAt")?)?;
    let updated_at = parse_datetime(get("updatedAt")?)?;

    Ok(Task::new(
        id, title, description, status, priority, deadline, created_at, updated_at,
    ))
}

fn single_line(id: u64, field: &'static str, value: &str) -> String {
    if has_line_break(value) {
        warn!(id, field, "replacing line breaks with spaces");
        fold_line_breaks(value)
    } else {
        value.to_string()
    }
}
