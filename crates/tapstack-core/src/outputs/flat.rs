//! Flat output mapping

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ConfigError, ConfigResult};

/// Where deployment writes its flat outputs, relative to the project
pub const DEFAULT_OUTPUTS_FILE: &str = "cfn-outputs/flat-outputs.json";

/// Single-level key → value mapping of exported stack values
///
/// Values are strings or arrays of strings in practice; anything JSON can
/// hold is accepted and rendered to text on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatOutputs {
    values: BTreeMap<String, Value>,
}

impl FlatOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Load outputs; `Ok(None)` means the file does not exist
    ///
    /// A missing file is the signal to skip verification, not a failure.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::outputs(path, e))?;
        Self::parse(&content)
            .map(Some)
            .map_err(|e| ConfigError::outputs(path, e))
    }

    /// Parse outputs JSON; the root must be an object
    pub fn parse(json: &str) -> ConfigResult<Self> {
        let root: Value = serde_json::from_str(json)?;
        match root {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(ConfigError::Other(format!(
                "outputs must be a JSON object, found {}",
                json_type(&other)
            ))),
        }
    }

    /// Write outputs as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value rendered as text; `null` counts as absent
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Value as a list of strings (see [`to_string_list`])
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.values.get(key).map(to_string_list).unwrap_or_default()
    }

    /// Whether every key is present with a non-null value
    pub fn has_keys(&self, keys: &[&str]) -> bool {
        keys.iter()
            .all(|k| matches!(self.values.get(*k), Some(v) if !v.is_null()))
    }

    /// Keys from `keys` that are absent or null
    pub fn missing_keys<'k>(&self, keys: &[&'k str]) -> Vec<&'k str> {
        keys.iter()
            .copied()
            .filter(|k| !self.has_keys(&[k]))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalise an output value to a list of strings
///
/// - arrays: each element as text
/// - strings holding a JSON array (optionally wrapped in quotes): the parsed
///   list, falling back to splitting if it doesn't parse
/// - other strings: split on commas and/or whitespace
/// - null: empty; other scalars: one element
pub fn to_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(value_text).collect(),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Vec::new();
            }

            let quoted = t.len() >= 3 && t.starts_with("\"[") && t.ends_with("]\"");
            if quoted || (t.starts_with('[') && t.ends_with(']')) {
                let inner = if quoted { &t[1..t.len() - 1] } else { t };
                if let Ok(list) = serde_json::from_str::<Vec<String>>(inner) {
                    return list;
                }
            }

            t.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|x| !x.is_empty())
                .map(str::to_string)
                .collect()
        }
        other => vec![value_text(other)],
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First match of `pattern` in `raw`, or `raw` trimmed when nothing matches
///
/// Pulls a clean id such as `rtb-0abc12` out of decorated values like
/// `r-rtb-0abc12`. An invalid pattern behaves like "no match".
pub fn extract_id(raw: &str, pattern: &str) -> String {
    match Regex::new(pattern) {
        Ok(re) => re
            .find(raw)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| raw.trim().to_string()),
        Err(e) => {
            crate::logging::warn("outputs", &format!("invalid id pattern {:?}: {}", pattern, e));
            raw.trim().to_string()
        }
    }
}
