//! Structured deployment context

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::{ConfigError, ConfigResult};

/// Key/value deployment parameters supplied by the invoker
///
/// Values keep their JSON type so that flags such as `enableCloudTrail` can be
/// real booleans, while string-valued settings are read through
/// [`ContextMap::get_string`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextMap {
    values: BTreeMap<String, Value>,
}

/// `cdk.json` layout: only the `context` member is of interest
#[derive(Debug, Deserialize)]
struct CdkJson {
    #[serde(default)]
    context: Option<BTreeMap<String, Value>>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value rendered as a string
    ///
    /// `null` is treated as absent. Strings are returned verbatim (possibly
    /// blank), other scalars in their JSON text form, and arrays/objects as
    /// compact JSON.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Value read as a boolean
    ///
    /// Accepts JSON booleans and the strings `true`/`false` in any case.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Overlay `other` onto this map; keys in `other` win
    pub fn merge(&mut self, other: ContextMap) {
        self.values.extend(other.values);
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

    /// Read the `context` member of a `cdk.json`-style file
    ///
    /// A missing file or a file without a `context` member yields an empty
    /// map. Unparseable JSON is an error.
    pub fn from_cdk_json(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let parsed: CdkJson = serde_json::from_str(&content)
            .map_err(|e| ConfigError::context_file(path, e))?;

        Ok(Self {
            values: parsed.context.unwrap_or_default(),
        })
    }

    /// Read a flat YAML mapping of context values
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let values: BTreeMap<String, Value> = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::context_file(path, format!("Failed to parse YAML: {}", e)))?;
        Ok(Self { values })
    }

    /// Read a JSON context file
    ///
    /// Accepts either a `cdk.json`-style document (values under `context`)
    /// or a flat object such as `cdk.context.json`.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::context_file(path, e))?;

        let values = match root {
            Value::Object(mut map) => match map.remove("context") {
                Some(Value::Object(context)) => context.into_iter().collect(),
                Some(_) => return Err(ConfigError::context_file(path, "`context` must be an object")),
                None => map.into_iter().collect(),
            },
            _ => return Err(ConfigError::context_file(path, "expected a JSON object")),
        };
        Ok(Self { values })
    }

    /// Read a context file, choosing the format from its extension
    ///
    /// `.yaml`/`.yml` files are flat mappings; anything else is treated as
    /// `cdk.json`-style JSON.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_json_file(path),
        }
    }

    /// Parse a `key=value` override as given on the command line
    ///
    /// Splits on the first `=`. `true`/`false` become booleans, everything
    /// else stays a string (including the empty string).
    pub fn parse_override(raw: &str) -> ConfigResult<(String, Value)> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidContextOverride(raw.to_string()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidContextOverride(raw.to_string()));
        }

        let value = match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        Ok((key.to_string(), value))
    }

    /// Apply a `key=value` override
    pub fn apply_override(&mut self, raw: &str) -> ConfigResult<()> {
        let (key, value) = Self::parse_override(raw)?;
        self.values.insert(key, value);
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
