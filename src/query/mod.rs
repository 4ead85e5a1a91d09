//! Declarative query-string encoding.
//!
//! Parameter objects declare a descriptor table ([`QueryParameters`]); the
//! [`QueryStringEncoder`] walks it in declaration order, validates required
//! fields, drops optional zero values and renders the rest, optionally through
//! a [`ValueConverter`]. Filter objects ([`FilterParameters`]) use the
//! engine's nested `filters` JSON convention instead.

pub mod convert;
mod descriptor;
mod encoder;
pub mod escape;
mod filter;
mod value;

pub use convert::{ConverterRegistry, ValueConverter};
pub use descriptor::{ParameterDescriptor, QueryParameters};
pub use encoder::{QueryParameterSet, QueryStringEncoder, encode_query, encode_query_set};
pub use filter::{
    FILTERS_KEY, FilterExpression, FilterField, FilterParameters, encode_filters,
    filter_expression,
};
pub use value::{QueryValue, ValueKind};
