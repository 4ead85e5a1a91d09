use std::{collections::BTreeMap, time::Duration};

use crate::query::{ParameterDescriptor, QueryParameters, QueryValue, convert};

/// Query for `GET /containers/json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainersListParameters {
    /// Include stopped containers.
    pub all: bool,
    /// Return at most this many containers (0 means no limit).
    pub limit: u64,
    /// Include size information.
    pub size: bool,
    /// Engine filters, e.g. `{"status": ["running"]}`.
    pub filters: BTreeMap<String, Vec<String>>,
}

impl QueryParameters for ContainersListParameters {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
        ParameterDescriptor::new("all", "all", |p: &Self| Some(QueryValue::Bool(p.all)))
            .with_converter(convert::BOOL),
        ParameterDescriptor::new("limit", "limit", |p: &Self| Some(QueryValue::UInt(p.limit))),
        ParameterDescriptor::new("size", "size", |p: &Self| Some(QueryValue::Bool(p.size)))
            .with_converter(convert::BOOL),
        ParameterDescriptor::new("filters", "filters", |p: &Self| {
            Some(QueryValue::Map(p.filters.clone()))
        })
        .with_converter(convert::JSON),
    ];
}

/// Query for `GET /containers/{id}/logs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerLogsParameters {
    /// Keep the connection open and stream new output.
    pub follow: bool,
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Only output after this timestamp (unix seconds or RFC 3339).
    pub since: Option<String>,
    /// Only output before this timestamp.
    pub until: Option<String>,
    /// Prefix each line with its timestamp.
    pub timestamps: bool,
    /// Number of trailing lines, or `all`.
    pub tail: Option<String>,
}

impl QueryParameters for ContainerLogsParameters {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
        ParameterDescriptor::new("follow", "follow", |p: &Self| Some(QueryValue::Bool(p.follow)))
            .with_converter(convert::BOOL),
        ParameterDescriptor::new("stdout", "stdout", |p: &Self| Some(QueryValue::Bool(p.stdout)))
            .with_converter(convert::BOOL),
        ParameterDescriptor::new("stderr", "stderr", |p: &Self| Some(QueryValue::Bool(p.stderr)))
            .with_converter(convert::BOOL),
        ParameterDescriptor::new("since", "since", |p: &Self| p.since.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("until", "until", |p: &Self| p.until.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("timestamps", "timestamps", |p: &Self| {
            Some(QueryValue::Bool(p.timestamps))
        })
        .with_converter(convert::BOOL),
        ParameterDescriptor::new("tail", "tail", |p: &Self| p.tail.clone().map(QueryValue::Str)),
    ];
}

/// Query for `POST /containers/{id}/stop` and `/restart`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStopParameters {
    /// Grace period before the container is killed.
    pub wait_before_kill: Option<Duration>,
    /// Signal sent to stop the container.
    pub signal: Option<String>,
}

impl QueryParameters for ContainerStopParameters {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
        ParameterDescriptor::new("wait_before_kill", "t", |p: &Self| {
            p.wait_before_kill.map(QueryValue::Duration)
        })
        .with_converter(convert::DURATION_SECS),
        ParameterDescriptor::new("signal", "signal", |p: &Self| {
            p.signal.clone().map(QueryValue::Str)
        }),
    ];
}
