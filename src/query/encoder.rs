use std::{fmt, sync::Arc};

use super::{
    ConverterRegistry, ParameterDescriptor, QueryParameters, ValueConverter,
    escape::{escape_key, escape_value},
};
use crate::error::{Error, Result};

/// Ordered multi-map of query keys to their values.
///
/// Keys keep the order in which they were first inserted and every key holds
/// at least one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameterSet {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParameterSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append values under `key`. Empty `values` are ignored.
    pub fn append(&mut self, key: impl Into<String>, values: impl IntoIterator<Item = String>) {
        let key = key.into();
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((key, values.collect())),
        }
    }

    /// Values stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keys and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Render as `key=v1&key=v2&other=v3`, keys and values escaped.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, values) in &self.entries {
            let key = escape_key(key);
            for value in values {
                pairs.push(format!("{key}={}", escape_value(value)));
            }
        }
        pairs.join("&")
    }
}

impl fmt::Display for QueryParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

struct Field<T> {
    descriptor: ParameterDescriptor<T>,
    converter: Option<Arc<dyn ValueConverter>>,
}

/// Encodes parameter objects of type `T` into query strings.
///
/// Converters named by the descriptor table are resolved once, at
/// construction. Encoding itself is pure and the encoder can be shared across
/// threads.
pub struct QueryStringEncoder<T> {
    fields: Vec<Field<T>>,
}

impl<T: QueryParameters> QueryStringEncoder<T> {
    /// Build an encoder for `T`, resolving its converters from `registry`.
    pub fn new(registry: &ConverterRegistry) -> Result<Self> {
        if T::DESCRIPTORS.is_empty() {
            return Err(Error::configuration(format!(
                "no encodable fields declared for {}",
                std::any::type_name::<T>()
            )));
        }

        let mut fields = Vec::with_capacity(T::DESCRIPTORS.len());
        for descriptor in T::DESCRIPTORS {
            if descriptor.key().is_empty() {
                return Err(Error::configuration(format!(
                    "field '{}' has an empty query key",
                    descriptor.field()
                )));
            }

            let converter = match descriptor.converter() {
                Some(id) => Some(registry.resolve(id)?),
                None => None,
            };

            fields.push(Field {
                descriptor: *descriptor,
                converter,
            });
        }

        Ok(Self { fields })
    }

    /// Encode `params` into an ordered parameter set.
    pub fn encode_set(&self, params: &T) -> Result<QueryParameterSet> {
        let mut set = QueryParameterSet::new();

        for field in &self.fields {
            let descriptor = &field.descriptor;
            let value = match descriptor.read(params) {
                Some(v) => v,
                None if descriptor.is_required() => {
                    return Err(Error::MissingRequiredParameter {
                        field: descriptor.field(),
                    });
                }
                None => continue,
            };

            if !descriptor.is_required() && value.is_zero() {
                continue;
            }

            let values = match (&field.converter, descriptor.converter()) {
                (Some(converter), Some(id)) => {
                    if !converter.can_convert(value.kind()) {
                        return Err(Error::UnsupportedConversion {
                            field: descriptor.field(),
                            kind: value.kind(),
                            converter: id.to_string(),
                        });
                    }

                    let values = converter.convert(&value)?;
                    if values.is_empty() {
                        return Err(Error::ConverterContractViolation {
                            field: descriptor.field(),
                            converter: id.to_string(),
                        });
                    }
                    values
                }
                _ => match value.natural() {
                    Some(s) => vec![s],
                    None => {
                        return Err(Error::UnsupportedConversion {
                            field: descriptor.field(),
                            kind: value.kind(),
                            converter: "natural".to_string(),
                        });
                    }
                },
            };

            set.append(descriptor.key(), values);
        }

        Ok(set)
    }

    /// Encode `params` into a query string (without the leading `?`).
    pub fn encode(&self, params: &T) -> Result<String> {
        self.encode_set(params).map(|set| set.to_query_string())
    }
}

impl<T> fmt::Debug for QueryStringEncoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStringEncoder")
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|field| &field.descriptor)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Encode `params` with the built-in converters.
pub fn encode_query<T: QueryParameters>(params: &T) -> Result<String> {
    QueryStringEncoder::new(&ConverterRegistry::with_defaults())?.encode(params)
}

/// Encode `params` into a parameter set with the built-in converters.
pub fn encode_query_set<T: QueryParameters>(params: &T) -> Result<QueryParameterSet> {
    QueryStringEncoder::new(&ConverterRegistry::with_defaults())?.encode_set(params)
}
