// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field access over raw JSON objects with casing reconciliation
//!
//! Exports mix `position`/`Position` and `x`/`X`. Lookups try the exact
//! lower-camel name, then PascalCase, then any ASCII-case-insensitive match.
//! Nothing past the normalizer sees the raw casing.

use serde_json::{Map, Value};

/// A present value that is not a usable number
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NotNumeric(pub String);

/// Look up `name` on `obj` regardless of casing
pub(crate) fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(v) = obj.get(name) {
        return Some(v);
    }
    let pascal = to_pascal(name);
    if let Some(v) = obj.get(&pascal) {
        return Some(v);
    }
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// First present field among several aliases
pub(crate) fn field_any<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| field(obj, name))
}

fn to_pascal(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Interpret a value as a number. JSON numbers and numeric strings (decimal
/// comma accepted) resolve; `null` counts as absent.
pub(crate) fn as_number(value: &Value) -> Result<Option<f64>, NotNumeric> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| NotNumeric(n.to_string())),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| NotNumeric(s.clone()))
        }
        other => Err(NotNumeric(other.to_string())),
    }
}

/// Optional numeric field; a malformed value is treated as absent
pub(crate) fn optional_number(obj: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    field_any(obj, names).and_then(|v| as_number(v).ok().flatten())
}

/// String-like field (numbers are stringified, e.g. numeric ids)
pub(crate) fn string_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field_any(obj, names).and_then(value_to_string)
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Array field, or an empty slice
pub(crate) fn array_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> &'a [Value] {
    field_any(obj, names)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Presence flag for an optional feature: any non-null, non-empty value
pub(crate) fn is_present(obj: &Map<String, Value>, names: &[&str]) -> bool {
    match field_any(obj, names) {
        None | Some(Value::Null) => false,
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(_)) => true,
    }
}
