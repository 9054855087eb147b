//! Config loading and format parsing operations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SoloistError};

use super::model::AppConfig;

impl AppConfig {
    /// Loads configuration from a file, merging its values over defaults.
    ///
    /// The format is chosen by extension: `.json` and `.yaml`/`.yml` get
    /// the usual parsers, anything else is treated as ini, the historical
    /// default. An empty file means no overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|_| SoloistError::ConfigNotFound {
            path: path.to_path_buf(),
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let values = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => parse_json(path, &content)?,
            Some("yaml") | Some("yml") => parse_yaml(path, &content)?,
            _ => parse_ini(&content),
        };
        Self::from_values(path, values)
    }

    /// Deserializes a flat key-value mapping into the config model.
    ///
    /// Recognized keys fill the typed fields, everything else lands in
    /// `extra` through the flattened map. Type mismatches on recognized
    /// keys surface as parse errors.
    fn from_values(path: &Path, values: BTreeMap<String, Value>) -> Result<Self> {
        let object: serde_json::Map<String, Value> = values.into_iter().collect();
        serde_json::from_value(Value::Object(object)).map_err(|e| SoloistError::ConfigParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }
}

fn parse_json(path: &Path, content: &str) -> Result<BTreeMap<String, Value>> {
    let value: Value = serde_json::from_str(content).map_err(|e| SoloistError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    into_mapping(path, value)
}

fn parse_yaml(path: &Path, content: &str) -> Result<BTreeMap<String, Value>> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| SoloistError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    into_mapping(path, value)
}

fn into_mapping(path: &Path, value: Value) -> Result<BTreeMap<String, Value>> {
    match value {
        Value::Object(object) => Ok(object.into_iter().collect()),
        other => Err(SoloistError::ConfigParse {
            path: path.to_path_buf(),
            detail: format!("expected a mapping at the top level, got {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

/// Parses the ini subset the scaffold supports: `key = value` pairs,
/// `;` and `#` comments, section headers flattened into the top level,
/// quoted values unquoted, booleans and integers coerced. Lines that fit
/// none of these are skipped.
fn parse_ini(content: &str) -> BTreeMap<String, Value> {
    let mut values = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            continue;
        }
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        values.insert(key.trim().to_string(), coerce_ini_value(raw.trim()));
    }
    values
}

fn coerce_ini_value(raw: &str) -> Value {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')));
    if let Some(text) = unquoted {
        return Value::String(text.to_string());
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => return Value::Bool(true),
        "false" | "no" | "off" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    Value::String(raw.to_string())
}
