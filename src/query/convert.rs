//! Pluggable value converters.

use std::{collections::HashMap, fmt, sync::Arc};

use super::{QueryValue, ValueKind};
use crate::error::{Error, Result};

/// Identifier of the boolean converter (`"1"` / `"0"`).
pub const BOOL: &str = "bool";
/// Identifier of the list converter (one query value per element).
pub const LIST: &str = "list";
/// Identifier of the JSON converter (compact JSON text).
pub const JSON: &str = "json";
/// Identifier of the duration converter (whole seconds).
pub const DURATION_SECS: &str = "duration-secs";

/// Translates a typed value into one or more query values.
///
/// `convert` is only called after `can_convert` accepted the value's kind and
/// must return at least one string.
pub trait ValueConverter: Send + Sync {
    /// Whether this converter handles values of `kind`.
    fn can_convert(&self, kind: ValueKind) -> bool;

    /// Convert a value into its ordered query values.
    fn convert(&self, value: &QueryValue) -> Result<Vec<String>>;
}

/// Booleans as the engine's `1` / `0` flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl ValueConverter for BoolConverter {
    fn can_convert(&self, kind: ValueKind) -> bool {
        kind == ValueKind::Bool
    }

    fn convert(&self, value: &QueryValue) -> Result<Vec<String>> {
        match value {
            QueryValue::Bool(true) => Ok(vec!["1".to_string()]),
            QueryValue::Bool(false) => Ok(vec!["0".to_string()]),
            _ => Ok(Vec::new()),
        }
    }
}

/// Repeats the key once per list element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListConverter;

impl ValueConverter for ListConverter {
    fn can_convert(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::List | ValueKind::Str)
    }

    fn convert(&self, value: &QueryValue) -> Result<Vec<String>> {
        match value {
            QueryValue::List(items) => Ok(items.clone()),
            QueryValue::Str(s) => Ok(vec![s.clone()]),
            _ => Ok(Vec::new()),
        }
    }
}

/// Serializes maps and JSON values as compact JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl ValueConverter for JsonConverter {
    fn can_convert(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Map | ValueKind::Json | ValueKind::List)
    }

    fn convert(&self, value: &QueryValue) -> Result<Vec<String>> {
        let text = match value {
            QueryValue::Map(map) => serde_json::to_string(map)?,
            QueryValue::Json(v) => serde_json::to_string(v)?,
            QueryValue::List(items) => serde_json::to_string(items)?,
            _ => return Ok(Vec::new()),
        };
        Ok(vec![text])
    }
}

/// Durations as whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationSecondsConverter;

impl ValueConverter for DurationSecondsConverter {
    fn can_convert(&self, kind: ValueKind) -> bool {
        kind == ValueKind::Duration
    }

    fn convert(&self, value: &QueryValue) -> Result<Vec<String>> {
        match value {
            QueryValue::Duration(d) => Ok(vec![d.as_secs().to_string()]),
            _ => Ok(Vec::new()),
        }
    }
}

/// Converters keyed by identifier.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn ValueConverter>>,
}

impl ConverterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in converters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BOOL, BoolConverter);
        registry.register(LIST, ListConverter);
        registry.register(JSON, JsonConverter);
        registry.register(DURATION_SECS, DurationSecondsConverter);
        registry
    }

    /// Register a converter, replacing any previous one under the same id.
    pub fn register(&mut self, id: impl Into<String>, converter: impl ValueConverter + 'static) {
        self.converters.insert(id.into(), Arc::new(converter));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, converter: impl ValueConverter + 'static) -> Self {
        self.register(id, converter);
        self
    }

    /// Look up a converter.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn ValueConverter>> {
        self.converters
            .get(id)
            .cloned()
            .ok_or_else(|| Error::configuration(format!("no converter registered as '{id}'")))
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("converters", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, time::Duration};

    use super::*;

    #[test]
    fn bool_converter_emits_flags() -> Result<()> {
        assert_eq!(BoolConverter.convert(&QueryValue::Bool(true))?, vec!["1"]);
        assert_eq!(BoolConverter.convert(&QueryValue::Bool(false))?, vec!["0"]);
        assert!(!BoolConverter.can_convert(ValueKind::Str));
        Ok(())
    }

    #[test]
    fn json_converter_renders_maps_compactly() -> Result<()> {
        let mut map = BTreeMap::new();
        map.insert("label".to_string(), vec!["a=b".to_string()]);
        let out = JsonConverter.convert(&QueryValue::Map(map))?;
        assert_eq!(out, vec![r#"{"label":["a=b"]}"#]);
        Ok(())
    }

    #[test]
    fn duration_converter_truncates_to_seconds() -> Result<()> {
        let value = QueryValue::Duration(Duration::from_millis(90_500));
        let out = DurationSecondsConverter.convert(&value)?;
        assert_eq!(out, vec!["90"]);
        Ok(())
    }

    #[test]
    fn unknown_id_is_a_configuration_error() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.resolve(LIST).is_ok());
        let err = registry.resolve("epoch").err();
        assert!(matches!(err, Some(Error::Configuration { .. })));
    }
}
