//! JSONPath evaluator - minimal subset
//!
//! Supports:
//! - $.a.b.c (dot notation)
//! - $.a[0].b (array index)
//! - $['user-provided'][0] (quoted member names, single or double quotes)
//! - a.b.c (without $ prefix, used for credential keys)
//!
//! Does NOT support:
//! - Filters: $.a[?(@.x==1)]
//! - Wildcards: $.a[*]
//! - Slices: $.a[0:5]
//!
//! Every resolver that digs into JSON goes through [`read_scalar`], so a
//! query behaves the same whichever source supplied the document.

use serde_json::Value;

use crate::error::{BindingError, Result};

/// A parsed JSONPath segment
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access: .field or ['field']
    Field(String),
    /// Array index access: [0]
    Index(usize),
}

/// Parse a JSONPath string into segments
///
/// Examples:
/// - "$.price.currency" → [Field("price"), Field("currency")]
/// - "items[0].name" → [Field("items"), Index(0), Field("name")]
/// - "$['user-provided'][0]" → [Field("user-provided"), Index(0)]
pub fn parse(path: &str) -> Result<Vec<Segment>> {
    let unsupported = || BindingError::JsonPathUnsupported {
        path: path.to_string(),
    };

    let trimmed = path.trim();
    let (mut rest, mut implicit_field) = match trimmed.strip_prefix('$') {
        Some(stripped) => (stripped, false),
        None => (trimmed, true),
    };

    let mut segments = Vec::new();

    while !rest.is_empty() {
        if implicit_field {
            // Leading bare member name: "a.b" or "items[0]"
            implicit_field = false;
            let (name, tail) = take_member(rest);
            if name.is_empty() {
                if rest.starts_with('[') {
                    continue;
                }
                return Err(unsupported());
            }
            segments.push(member_segment(name));
            rest = tail;
        } else if let Some(after_dot) = rest.strip_prefix('.') {
            let (name, tail) = take_member(after_dot);
            if name.is_empty() {
                return Err(unsupported());
            }
            segments.push(member_segment(name));
            rest = tail;
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let (segment, tail) = take_bracket(after_bracket).ok_or_else(unsupported)?;
            segments.push(segment);
            rest = tail;
        } else {
            return Err(unsupported());
        }
    }

    Ok(segments)
}

/// Split off a dot-notation member name, stopping at the next `.` or `[`
fn take_member(input: &str) -> (&str, &str) {
    let end = input.find(['.', '[']).unwrap_or(input.len());
    (&input[..end], &input[end..])
}

/// Numeric segment treated as array index (e.g., "items.0")
fn member_segment(name: &str) -> Segment {
    match name.parse::<usize>() {
        Ok(index) => Segment::Index(index),
        Err(_) => Segment::Field(name.to_string()),
    }
}

/// Parse the inside of `[...]` (opening bracket already consumed)
fn take_bracket(input: &str) -> Option<(Segment, &str)> {
    let quote = input.chars().next()?;
    if quote == '\'' || quote == '"' {
        let body = &input[1..];
        let close = body.find(quote)?;
        let tail = body[close + 1..].strip_prefix(']')?;
        return Some((Segment::Field(body[..close].to_string()), tail));
    }

    let close = input.find(']')?;
    let index = input[..close].trim().parse::<usize>().ok()?;
    Some((Segment::Index(index), &input[close + 1..]))
}

/// Apply JSONPath segments to a JSON value
///
/// Walks by reference; the caller decides whether to clone.
pub fn apply<'a>(value: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let mut current = value;

    for segment in segments {
        current = match segment {
            Segment::Field(name) => current.get(name)?,
            Segment::Index(idx) => current.get(*idx)?,
        };
    }

    Some(current)
}

/// Parse and apply JSONPath in one step
pub fn resolve(value: &Value, path: &str) -> Result<Option<Value>> {
    let segments = parse(path)?;
    Ok(apply(value, &segments).cloned())
}

/// Evaluate a query and render the match as a scalar string
///
/// Strings come back verbatim, numbers and booleans as their JSON text.
/// Null, objects and arrays are not scalars and count as "not found".
pub fn read_scalar(value: &Value, path: &str) -> Result<Option<String>> {
    let segments = parse(path)?;
    Ok(apply(value, &segments).and_then(scalar_text))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
