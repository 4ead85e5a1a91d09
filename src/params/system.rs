use std::collections::BTreeMap;

use crate::query::{ParameterDescriptor, QueryParameters, QueryValue, convert};

/// Query for `GET /events`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventsParameters {
    /// Show events created since this timestamp.
    pub since: Option<String>,
    /// Show events created until this timestamp, then close the stream.
    pub until: Option<String>,
    /// Engine filters, e.g. `{"type": ["container"], "event": ["start"]}`.
    pub filters: BTreeMap<String, Vec<String>>,
}

impl EventsParameters {
    /// Add one filter value.
    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

impl QueryParameters for EventsParameters {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
        ParameterDescriptor::new("since", "since", |p: &Self| p.since.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("until", "until", |p: &Self| p.until.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("filters", "filters", |p: &Self| {
            Some(QueryValue::Map(p.filters.clone()))
        })
        .with_converter(convert::JSON),
    ];
}
