use std::{collections::BTreeMap, time::Duration};

use dockhand::{
    Error, ErrorKind,
    params::{
        ContainerLogsParameters, ContainerStopParameters, ContainersListParameters,
        EventsParameters, ImagesCreateParameters, ServiceFilter,
    },
    query::{
        ConverterRegistry, ParameterDescriptor, QueryParameters, QueryStringEncoder, QueryValue,
        ValueConverter, ValueKind, encode_filters, encode_query, encode_query_set,
        filter_expression,
    },
};
use proptest::prelude::*;

#[test]
fn optional_zero_values_are_omitted() -> dockhand::Result<()> {
    let params = ContainersListParameters::default();
    assert_eq!(encode_query(&params)?, "");

    let params = ContainersListParameters {
        all: true,
        limit: 0,
        size: false,
        filters: BTreeMap::new(),
    };
    assert_eq!(encode_query(&params)?, "all=1");
    Ok(())
}

#[test]
fn unset_required_field_fails_without_output() {
    let params = ImagesCreateParameters {
        tag: Some("latest".to_string()),
        ..ImagesCreateParameters::default()
    };

    match encode_query_set(&params) {
        Err(Error::MissingRequiredParameter { field }) => assert_eq!(field, "from_image"),
        other => panic!("expected MissingRequiredParameter, got {other:?}"),
    }
}

#[test]
fn required_field_is_kept_even_when_empty() -> dockhand::Result<()> {
    let params = ImagesCreateParameters {
        from_image: Some(String::new()),
        ..ImagesCreateParameters::default()
    };
    assert_eq!(encode_query(&params)?, "fromImage=");
    Ok(())
}

#[test]
fn list_field_repeats_the_key_in_order() -> dockhand::Result<()> {
    let params = ImagesCreateParameters {
        from_image: Some("-".to_string()),
        changes: vec!["ENV A=1".to_string(), "CMD sh".to_string()],
        ..ImagesCreateParameters::default()
    };
    assert_eq!(
        encode_query(&params)?,
        "fromImage=-&changes=ENV%20A%3D1&changes=CMD%20sh"
    );
    Ok(())
}

#[test]
fn output_follows_declaration_order() -> dockhand::Result<()> {
    let params = ContainerLogsParameters {
        tail: Some("10".to_string()),
        follow: true,
        stdout: true,
        since: Some("1700000000".to_string()),
        ..ContainerLogsParameters::default()
    };
    assert_eq!(
        encode_query(&params)?,
        "follow=1&stdout=1&since=1700000000&tail=10"
    );
    Ok(())
}

#[test]
fn map_filters_are_json_encoded() -> dockhand::Result<()> {
    let params = EventsParameters::default()
        .filter("type", "container")
        .filter("event", "start")
        .filter("event", "die");

    let set = encode_query_set(&params)?;
    assert_eq!(
        set.get("filters"),
        Some(&[r#"{"event":["start","die"],"type":["container"]}"#.to_string()][..])
    );
    assert_eq!(
        set.to_query_string(),
        "filters=%7B%22event%22%3A%5B%22start%22%2C%22die%22%5D%2C%22type%22%3A%5B%22container%22%5D%7D"
    );
    Ok(())
}

#[test]
fn durations_are_sent_in_seconds() -> dockhand::Result<()> {
    let params = ContainerStopParameters {
        wait_before_kill: Some(Duration::from_secs(30)),
        signal: Some("SIGTERM".to_string()),
    };
    assert_eq!(encode_query(&params)?, "t=30&signal=SIGTERM");
    Ok(())
}

struct Scoped {
    path: String,
}

impl QueryParameters for Scoped {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] =
        &[ParameterDescriptor::new("path", "scope/path", |p: &Scoped| {
            Some(QueryValue::Str(p.path.clone()))
        })];
}

#[test]
fn keys_keep_slashes_and_values_escape_them() -> dockhand::Result<()> {
    let params = Scoped {
        path: "/var/lib/data dir".to_string(),
    };
    assert_eq!(encode_query(&params)?, "scope/path=%2Fvar%2Flib%2Fdata%20dir");
    Ok(())
}

struct Flags {
    names: Vec<String>,
}

impl QueryParameters for Flags {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] =
        &[ParameterDescriptor::new("names", "name", |p: &Flags| {
            Some(QueryValue::List(p.names.clone()))
        })
        .with_converter("bool")];
}

#[test]
fn converter_rejecting_the_kind_is_unsupported() {
    let params = Flags {
        names: vec!["a".to_string()],
    };
    let err = encode_query(&params).err();
    match err {
        Some(Error::UnsupportedConversion {
            field,
            kind,
            converter,
        }) => {
            assert_eq!(field, "names");
            assert_eq!(kind, ValueKind::List);
            assert_eq!(converter, "bool");
        }
        other => panic!("expected UnsupportedConversion, got {other:?}"),
    }
}

struct Raw {
    labels: Vec<String>,
}

impl QueryParameters for Raw {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] =
        &[ParameterDescriptor::new("labels", "label", |p: &Raw| {
            Some(QueryValue::List(p.labels.clone()))
        })];
}

#[test]
fn collections_need_a_converter() {
    let params = Raw {
        labels: vec!["a".to_string()],
    };
    let err = encode_query(&params).err();
    assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::Conversion));
}

struct Upper;

impl ValueConverter for Upper {
    fn can_convert(&self, kind: ValueKind) -> bool {
        kind == ValueKind::Str
    }

    fn convert(&self, value: &QueryValue) -> dockhand::Result<Vec<String>> {
        match value {
            QueryValue::Str(s) => Ok(vec![s.to_uppercase()]),
            _ => Ok(Vec::new()),
        }
    }
}

struct Shout {
    word: String,
}

impl QueryParameters for Shout {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] =
        &[ParameterDescriptor::new("word", "word", |p: &Shout| {
            Some(QueryValue::Str(p.word.clone()))
        })
        .with_converter("upper")];
}

#[test]
fn custom_converters_are_resolved_by_id() -> dockhand::Result<()> {
    let params = Shout {
        word: "hi".to_string(),
    };

    let missing = QueryStringEncoder::<Shout>::new(&ConverterRegistry::with_defaults()).err();
    assert_eq!(missing.map(|e| e.kind()), Some(ErrorKind::Configuration));

    let registry = ConverterRegistry::with_defaults().with("upper", Upper);
    let encoder = QueryStringEncoder::<Shout>::new(&registry)?;
    assert_eq!(encoder.encode(&params)?, "word=HI");
    Ok(())
}

#[test]
fn filter_with_unknown_mode_is_rejected() {
    let filter = ServiceFilter {
        id: "x".to_string(),
        mode: "bogus".to_string(),
        ..ServiceFilter::default()
    };
    match encode_filters(&filter) {
        Err(Error::InvalidFilterValue { field, value, .. }) => {
            assert_eq!(field, "Mode");
            assert_eq!(value, "bogus");
        }
        other => panic!("expected InvalidFilterValue, got {other:?}"),
    }
}

#[test]
fn filter_matches_the_engine_wire_format() -> dockhand::Result<()> {
    let filter = ServiceFilter {
        id: "x".to_string(),
        mode: "global".to_string(),
        ..ServiceFilter::default()
    };
    assert_eq!(
        encode_filters(&filter)?,
        "filters=%7B%22id%22%3A%7B%22x%22%3Atrue%7D%2C%22mode%22%3A%7B%22global%22%3Atrue%7D%7D"
    );
    Ok(())
}

#[test]
fn filter_skips_empty_fields_and_escapes_values() -> dockhand::Result<()> {
    let filter = ServiceFilter {
        label: "com.example/tier=web".to_string(),
        ..ServiceFilter::default()
    };
    let expr = filter_expression(&filter)?;
    assert_eq!(expr.to_json()?, r#"{"label":{"com.example%2Ftier%3Dweb":true}}"#);
    Ok(())
}

fn optional_zero_fields() -> impl Strategy<Value = ContainerLogsParameters> {
    (any::<bool>(), any::<bool>(), proptest::option::of("[a-z0-9]{0,6}")).prop_map(
        |(follow, stderr, tail)| ContainerLogsParameters {
            follow,
            stderr,
            tail,
            ..ContainerLogsParameters::default()
        },
    )
}

proptest! {
    #[test]
    fn zero_valued_fields_never_reach_the_query(params in optional_zero_fields()) {
        let query = encode_query(&params).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(query.contains("follow="), params.follow);
        prop_assert_eq!(query.contains("stderr="), params.stderr);
        prop_assert!(!query.contains("stdout="));
        prop_assert!(!query.contains("timestamps="));
        let tail_set = params.tail.as_deref().is_some_and(|t| !t.is_empty());
        prop_assert_eq!(query.contains("tail="), tail_set);
    }
}
