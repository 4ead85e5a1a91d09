use std::fmt;

use super::QueryValue;

/// Static metadata describing how one field of a parameter object maps to a
/// query key.
///
/// Descriptors are built in `const` context, so a whole table can live in an
/// associated constant:
///
/// ```
/// use dockhand::query::{ParameterDescriptor, QueryParameters, QueryValue};
///
/// struct Prune {
///     all: bool,
///     until: Option<String>,
/// }
///
/// impl QueryParameters for Prune {
///     const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
///         ParameterDescriptor::new("all", "all", |p: &Prune| Some(QueryValue::Bool(p.all)))
///             .with_converter("bool"),
///         ParameterDescriptor::new("until", "until", |p: &Prune| {
///             p.until.clone().map(QueryValue::Str)
///         }),
///     ];
/// }
/// ```
pub struct ParameterDescriptor<T> {
    field: &'static str,
    key: &'static str,
    required: bool,
    converter: Option<&'static str>,
    read: fn(&T) -> Option<QueryValue>,
}

impl<T> ParameterDescriptor<T> {
    /// An optional field encoded under `key`.
    ///
    /// `read` returns `None` when the field is unset.
    #[must_use]
    pub const fn new(
        field: &'static str,
        key: &'static str,
        read: fn(&T) -> Option<QueryValue>,
    ) -> Self {
        Self {
            field,
            key,
            required: false,
            converter: None,
            read,
        }
    }

    /// Mark the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Route the value through the converter registered under `id`.
    #[must_use]
    pub const fn with_converter(mut self, id: &'static str) -> Self {
        self.converter = Some(id);
        self
    }

    /// Source field name.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Query key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Whether the field must be set.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Converter identifier, if any.
    #[must_use]
    pub fn converter(&self) -> Option<&'static str> {
        self.converter
    }

    /// Read the field from a parameter object.
    pub fn read(&self, params: &T) -> Option<QueryValue> {
        (self.read)(params)
    }
}

impl<T> Clone for ParameterDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ParameterDescriptor<T> {}

impl<T> fmt::Debug for ParameterDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("field", &self.field)
            .field("key", &self.key)
            .field("required", &self.required)
            .field("converter", &self.converter)
            .finish()
    }
}

/// A parameter object whose fields participate in query encoding.
///
/// The table is iterated in declaration order, which makes the encoded query
/// reproducible.
pub trait QueryParameters: Sized + 'static {
    /// Descriptor table for this type.
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>];
}
