//! Placeholder token helpers.
//!
//! A placeholder variable `series_1_data` appears in templates as the token
//! `${series_1_data}`. A string that is exactly one token is a *whole-string*
//! token and may be replaced by a value of any JSON type; tokens embedded in
//! longer strings are reported but never substituted.

use serde_json::Value;

use crate::{ModelError, Result};

pub const TOKEN_PREFIX: &str = "${";
pub const TOKEN_SUFFIX: &str = "}";

/// Wraps a variable name into its token form.
pub fn token(variable: &str) -> String {
    format!("{TOKEN_PREFIX}{variable}{TOKEN_SUFFIX}")
}

/// Variable named by a whole-string token, if `text` is one.
pub fn variable_of(text: &str) -> Option<&str> {
    let inner = text.strip_prefix(TOKEN_PREFIX)?.strip_suffix(TOKEN_SUFFIX)?;
    if is_valid_variable(inner) {
        Some(inner)
    } else {
        None
    }
}

pub fn is_token(text: &str) -> bool {
    variable_of(text).is_some()
}

/// Variable names are non-empty ASCII identifiers.
pub fn is_valid_variable(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// Parses a placeholder written either as a token or as a bare variable.
pub fn normalize(placeholder: &str) -> Result<String> {
    let trimmed = placeholder.trim();
    if let Some(variable) = variable_of(trimmed) {
        return Ok(token(variable));
    }
    if is_valid_variable(trimmed) {
        return Ok(token(trimmed));
    }
    Err(ModelError::InvalidPlaceholder(placeholder.to_string()))
}

/// Every `${...}` occurrence inside `text`, in order.
pub fn tokens_in(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_PREFIX) {
        let after = &rest[start + TOKEN_PREFIX.len()..];
        let Some(end) = after.find(TOKEN_SUFFIX) else {
            break;
        };
        let inner = &after[..end];
        if is_valid_variable(inner) {
            found.push(token(inner));
        }
        rest = &after[end + TOKEN_SUFFIX.len()..];
    }
    found
}

/// Distinct tokens found anywhere in `value` (strings and object keys), in
/// document order.
pub fn extract_tokens(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect(value, &mut found);
    found
}

fn collect(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::String(s) => push_unique(found, tokens_in(s)),
        Value::Array(items) => {
            for item in items {
                collect(item, found);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                push_unique(found, tokens_in(key));
                collect(item, found);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn push_unique(found: &mut Vec<String>, tokens: Vec<String>) {
    for t in tokens {
        if !found.contains(&t) {
            found.push(t);
        }
    }
}

/// Which half of a series slot a variable names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPart {
    Name,
    Data,
}

/// Parses `series_<n>_name` / `series_<n>_data` (1-based slot numbers).
pub fn series_slot_of(variable: &str) -> Option<(usize, SeriesPart)> {
    let rest = variable.strip_prefix("series_")?;
    let (number, part) = rest.split_once('_')?;
    let slot = number.parse::<usize>().ok().filter(|n| *n > 0)?;
    let part = match part {
        "name" => SeriesPart::Name,
        "data" => SeriesPart::Data,
        _ => return None,
    };
    Some((slot, part))
}

pub fn series_name_variable(slot: usize) -> String {
    format!("series_{slot}_name")
}

pub fn series_data_variable(slot: usize) -> String {
    format!("series_{slot}_data")
}
