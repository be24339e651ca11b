//! Minimal JSON paths of the form `$.series[0].data`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ModelError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |message: &str| ModelError::InvalidPath {
            path: text.to_string(),
            message: message.to_string(),
        };
        let mut rest = text
            .trim()
            .strip_prefix('$')
            .ok_or_else(|| invalid("must start with '$'"))?;
        let mut segments = Vec::new();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                let key = &after[..end];
                if key.is_empty() {
                    return Err(invalid("empty key"));
                }
                segments.push(Segment::Key(key.to_string()));
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                let index = after[..end]
                    .parse::<usize>()
                    .map_err(|_| invalid("index must be a non-negative integer"))?;
                segments.push(Segment::Index(index));
                rest = &after[end + 1..];
            } else {
                return Err(invalid("expected '.' or '['"));
            }
        }
        Ok(Self { segments })
    }

    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                Segment::Key(key) => current.get(key.as_str()),
                Segment::Index(index) => current.get(*index),
            })
    }

    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                Segment::Key(key) => current.get_mut(key.as_str()),
                Segment::Index(index) => current.get_mut(*index),
            })
    }

    /// Replaces the value at this path. The path must already exist.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<()> {
        let slot = self.get_mut(root).ok_or_else(|| ModelError::InvalidPath {
            path: self.to_string(),
            message: "path does not exist".to_string(),
        })?;
        *slot = value;
        Ok(())
    }

    /// First path (depth-first, document order) whose value is the string `needle`.
    pub fn locate(root: &Value, needle: &str) -> Option<JsonPath> {
        fn walk(value: &Value, needle: &str, path: &mut Vec<Segment>) -> bool {
            match value {
                Value::String(s) => s == needle,
                Value::Array(items) => items.iter().enumerate().any(|(i, item)| {
                    path.push(Segment::Index(i));
                    let hit = walk(item, needle, path);
                    if !hit {
                        path.pop();
                    }
                    hit
                }),
                Value::Object(map) => map.iter().any(|(key, item)| {
                    path.push(Segment::Key(key.clone()));
                    let hit = walk(item, needle, path);
                    if !hit {
                        path.pop();
                    }
                    hit
                }),
                Value::Null | Value::Bool(_) | Value::Number(_) => false,
            }
        }

        let mut segments = Vec::new();
        walk(root, needle, &mut segments).then_some(JsonPath { segments })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for JsonPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
