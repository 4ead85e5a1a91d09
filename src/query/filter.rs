//! The engine's nested `filters` query parameter.
//!
//! Filters travel as a single `filters` key whose value is JSON of the shape
//! `{"<field>": {"<value>": true}}`. Field names are lower-cased and values
//! are escaped before they are placed in the object; the JSON text is then
//! escaped again as a query value.

use serde_json::{Map, Value};

use super::escape::{escape_key, escape_value};
use crate::error::{Error, Result};

/// Query key carrying the filter expression.
pub const FILTERS_KEY: &str = "filters";

/// One filter field as exposed by a [`FilterParameters`] type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField<'a> {
    /// Field name, as declared (lower-cased on encode).
    pub name: &'static str,
    /// Current value; empty means unset.
    pub value: &'a str,
    /// Accepted values for constrained fields.
    pub allowed: Option<&'static [&'static str]>,
}

impl<'a> FilterField<'a> {
    /// An unconstrained field.
    #[must_use]
    pub fn new(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value,
            allowed: None,
        }
    }

    /// A field that must be empty or one of `allowed`.
    #[must_use]
    pub fn one_of(name: &'static str, value: &'a str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            value,
            allowed: Some(allowed),
        }
    }

    fn validate(&self) -> Result<()> {
        match self.allowed {
            Some(allowed) if !self.value.is_empty() && !allowed.contains(&self.value) => {
                Err(Error::InvalidFilterValue {
                    field: self.name,
                    value: self.value.to_string(),
                    allowed: allowed.join(", "),
                })
            }
            _ => Ok(()),
        }
    }
}

/// A parameter object encoded as a filter expression.
pub trait FilterParameters {
    /// The filter fields in declaration order.
    fn filter_fields(&self) -> Vec<FilterField<'_>>;
}

/// Accumulated `field -> value -> true` mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    fields: Map<String, Value>,
}

impl FilterExpression {
    /// An empty expression.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `field`.
    ///
    /// Empty values are skipped. Adding to a field that is already present
    /// merges the value into that field's set.
    pub fn insert(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }

        let entry = self
            .fields
            .entry(field.to_lowercase())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(values) = entry {
            values.insert(escape_value(value), Value::Bool(true));
        }
    }

    /// Whether no field has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values recorded under `field` (lower-cased name).
    pub fn values(&self, field: &str) -> impl Iterator<Item = &str> {
        self.fields
            .get(field)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|values| values.keys().map(String::as_str))
    }

    /// The expression as JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }

    /// The expression rendered as `filters=<escaped json>`.
    pub fn to_query_fragment(&self) -> Result<String> {
        Ok(format!(
            "{}={}",
            escape_key(FILTERS_KEY),
            escape_value(&self.to_json()?)
        ))
    }
}

/// Validate `params` and build its filter expression.
pub fn filter_expression<T: FilterParameters + ?Sized>(params: &T) -> Result<FilterExpression> {
    let fields = params.filter_fields();
    for field in &fields {
        field.validate()?;
    }

    let mut expression = FilterExpression::new();
    for field in &fields {
        expression.insert(field.name, field.value);
    }

    Ok(expression)
}

/// Encode `params` as a `filters=<json>` query fragment.
pub fn encode_filters<T: FilterParameters + ?Sized>(params: &T) -> Result<String> {
    filter_expression(params)?.to_query_fragment()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_field_merges_values() -> Result<()> {
        let mut expr = FilterExpression::new();
        expr.insert("Label", "a");
        expr.insert("label", "b");
        assert_eq!(expr.to_json()?, r#"{"label":{"a":true,"b":true}}"#);
        Ok(())
    }

    #[test]
    fn values_are_escaped_inside_the_json() -> Result<()> {
        let mut expr = FilterExpression::new();
        expr.insert("Name", "web/app");
        expr.insert("Id", "");
        assert_eq!(expr.to_json()?, r#"{"name":{"web%2Fapp":true}}"#);
        assert_eq!(expr.values("name").collect::<Vec<_>>(), vec!["web%2Fapp"]);
        Ok(())
    }

    #[test]
    fn empty_expression_renders_empty_object() -> Result<()> {
        assert_eq!(FilterExpression::new().to_query_fragment()?, "filters=%7B%7D");
        Ok(())
    }
}
