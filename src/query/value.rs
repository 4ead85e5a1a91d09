use std::{collections::BTreeMap, fmt, time::Duration};

use serde_json::Value;

/// A typed field value read from a parameter object.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum QueryValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Plain string.
    Str(String),
    /// Ordered list of strings.
    List(Vec<String>),
    /// String multi-map, the engine's `map[string][]string` shape.
    Map(BTreeMap<String, Vec<String>>),
    /// Arbitrary JSON.
    Json(Value),
    /// A time span.
    Duration(Duration),
}

/// Discriminant of a [`QueryValue`], used by converters to declare what they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// [`QueryValue::Bool`].
    Bool,
    /// [`QueryValue::Int`].
    Int,
    /// [`QueryValue::UInt`].
    UInt,
    /// [`QueryValue::Str`].
    Str,
    /// [`QueryValue::List`].
    List,
    /// [`QueryValue::Map`].
    Map,
    /// [`QueryValue::Json`].
    Json,
    /// [`QueryValue::Duration`].
    Duration,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Str => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Json => "json",
            Self::Duration => "duration",
        };
        f.write_str(name)
    }
}

impl QueryValue {
    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Str(_) => ValueKind::Str,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Json(_) => ValueKind::Json,
            Self::Duration(_) => ValueKind::Duration,
        }
    }

    /// Whether this is the zero value of its kind.
    ///
    /// Optional fields holding a zero value are left out of the query.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::UInt(n) => *n == 0,
            Self::Str(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Json(Value::Null) => true,
            Self::Json(Value::Object(obj)) => obj.is_empty(),
            Self::Json(Value::Array(arr)) => arr.is_empty(),
            Self::Json(_) => false,
            Self::Duration(d) => d.is_zero(),
        }
    }

    /// The single natural string form, if the kind has one.
    ///
    /// Collections have no natural form and need a converter.
    #[must_use]
    pub fn natural(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::UInt(n) => Some(n.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::Duration(d) => Some(d.as_secs().to_string()),
            Self::List(_) | Self::Map(_) | Self::Json(_) => None,
        }
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<BTreeMap<String, Vec<String>>> for QueryValue {
    fn from(v: BTreeMap<String, Vec<String>>) -> Self {
        Self::Map(v)
    }
}

impl From<Value> for QueryValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl From<Duration> for QueryValue {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_per_kind() {
        assert!(QueryValue::Bool(false).is_zero());
        assert!(QueryValue::Int(0).is_zero());
        assert!(QueryValue::Str(String::new()).is_zero());
        assert!(QueryValue::Json(Value::Null).is_zero());
        assert!(QueryValue::Json(serde_json::json!({})).is_zero());
        assert!(QueryValue::Duration(Duration::ZERO).is_zero());

        assert!(!QueryValue::Bool(true).is_zero());
        assert!(!QueryValue::Int(-1).is_zero());
        assert!(!QueryValue::Json(serde_json::json!(false)).is_zero());
    }

    #[test]
    fn collections_have_no_natural_form() {
        assert_eq!(QueryValue::List(vec!["a".into()]).natural(), None);
        assert_eq!(QueryValue::UInt(7).natural().as_deref(), Some("7"));
        assert_eq!(
            QueryValue::Duration(Duration::from_millis(2500)).natural().as_deref(),
            Some("2")
        );
    }
}
