//! Integration tests for the public matching API.
//!
//! Each test builds values through the public constructors (or
//! `serde_json::json!`) and calls `tmatch::matches` directly.

use chrono::{DateTime, Utc};
use serde_json::json;

use tmatch::{Matcher, Value, matches};

/// Route the matcher's `tracing` events to the test output. Filter with
/// `RUST_LOG=tmatch=trace`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn js(v: serde_json::Value) -> Value {
    Value::from(v)
}

fn re(source: &str, flags: &str) -> Value {
    Value::regex(source, flags).unwrap()
}

// ---------- Primitives ----------

#[test]
fn primitives_match_themselves() {
    for v in [
        Value::from(0),
        Value::from(-1.5),
        Value::from(""),
        Value::from("text"),
        Value::from(true),
        Value::from(false),
        Value::Undefined,
    ] {
        assert!(matches(&v, &v.clone()), "{v:?} should match itself");
    }
}

#[test]
fn primitives_use_loose_equality() {
    assert!(matches(&1.into(), &"1".into()));
    assert!(matches(&"1".into(), &1.into()));
    assert!(matches(&0.into(), &false.into()));
    assert!(matches(&"".into(), &0.into()));
    assert!(!matches(&"a".into(), &"b".into()));
    assert!(!matches(&f64::NAN.into(), &f64::NAN.into()));
}

#[test]
fn null_only_matches_null_and_undefined() {
    for other in [
        Value::from(0),
        Value::from(""),
        Value::from(false),
        js(json!({})),
        js(json!([])),
    ] {
        assert!(!matches(&Value::Null, &other), "null vs {other:?}");
        assert!(!matches(&other, &Value::Null), "{other:?} vs null");
    }
    assert!(matches(&Value::Null, &Value::Null));
    assert!(matches(&Value::Null, &Value::Undefined));
    assert!(matches(&Value::Undefined, &Value::Null));
}

#[test]
fn functions_match_only_by_reference() {
    let f = Value::function("handler");
    assert!(matches(&f, &f.clone()));
    assert!(!matches(&f, &Value::function("handler")));
}

// ---------- Regular expressions ----------

#[test]
fn string_value_against_regex_pattern() {
    assert!(matches(&"hello world".into(), &re("world$", "")));
    assert!(!matches(&"hello".into(), &re("world$", "")));
}

#[test]
fn regex_value_against_string_pattern_never_matches() {
    assert!(!matches(&re("abc", "i"), &"abc".into()));
}

#[test]
fn regexes_compare_by_source_and_flags() {
    assert!(matches(&re("a.c", "gm"), &re("a.c", "gm")));
    assert!(!matches(&re("abc", ""), &re("abc", "i")));
    assert!(!matches(&re("abc", "g"), &re("abc", "m")));
}

#[test]
fn regexes_compare_last_index() {
    let used = re("b", "g");
    let fresh = re("b", "g");
    assert!(matches(&"abc".into(), &used));
    assert!(!matches(&used, &fresh));
}

// ---------- Objects ----------

#[test]
fn extra_value_fields_are_tolerated() {
    assert!(matches(&js(json!({"a": 1, "b": 2})), &js(json!({"a": 1}))));
}

#[test]
fn extra_pattern_fields_are_rejected() {
    assert!(!matches(&js(json!({"a": 1})), &js(json!({"a": 1, "b": 2}))));
}

#[test]
fn nested_objects() {
    assert!(matches(&js(json!({"a": 1, "b": {"c": 2}})), &js(json!({"b": {"c": 2}}))));
    assert!(!matches(&js(json!({"a": 1, "b": {"c": 3}})), &js(json!({"b": {"c": 2}}))));
}

#[test]
fn empty_containers_match_each_other() {
    assert!(matches(&js(json!({})), &js(json!({}))));
    assert!(matches(&js(json!([])), &js(json!([]))));
    assert!(matches(&js(json!([])), &js(json!({}))));
    assert!(matches(&js(json!({})), &js(json!([]))));
}

#[test]
fn mixed_nested_pattern() {
    let value = js(json!({
        "user": {"name": "Ada", "roles": ["admin", "dev"], "id": 7},
        "meta": {"created": "2024"}
    }));
    let pattern = Value::object([(
        "user",
        Value::object([
            ("name", re("^a", "i")),
            ("roles", js(json!(["admin"]))),
            ("id", Value::from("7")),
        ]),
    )]);
    assert!(matches(&value, &pattern));

    pattern.get("user").set("missing", Value::from(1)).unwrap();
    assert!(!matches(&value, &pattern));
}

// ---------- Cycles ----------

#[test]
fn cyclic_value_with_self_pointing_pattern_terminates() {
    init_tracing();
    let value = Value::empty_object();
    value.set("self", value.clone()).unwrap();

    let pattern = Value::empty_object();
    let inner = Value::empty_object();
    pattern.set("self", inner.clone()).unwrap();
    inner.set("self", inner.clone()).unwrap();

    assert!(matches(&value, &pattern));
}

#[test]
fn cyclic_value_against_non_cyclic_pattern() {
    init_tracing();
    let value = Value::object([("id", Value::from(1))]);
    value.set("self", value.clone()).unwrap();
    assert!(matches(&value, &js(json!({"self": {}}))));
    assert!(matches(&value, &js(json!({"self": {"self": {"id": 1}}}))));
    assert!(!matches(&value, &js(json!({"self": {"id": 2}}))));
}

#[test]
fn cyclic_arrays() {
    init_tracing();
    let value = Value::array(vec![1.into()]);
    value.push(value.clone()).unwrap();
    let pattern = Value::array(vec![1.into()]);
    pattern.push(pattern.clone()).unwrap();
    assert!(matches(&value, &pattern));
}

// ---------- Dates ----------

#[test]
fn dates_compare_by_epoch_milliseconds() {
    let a = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
    let b = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
    let c = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_250).unwrap();

    // Same second when printed, different instant.
    let fmt = "%Y-%m-%d %H:%M:%S";
    assert_eq!(a.format(fmt).to_string(), c.format(fmt).to_string());

    assert!(matches(&Value::date_from(&a), &Value::date_from(&b)));
    assert!(!matches(&Value::date_from(&a), &Value::date_from(&c)));
}

#[test]
fn date_inside_object() {
    let value = Value::object([("at", Value::date(5.0)), ("n", Value::from(1))]);
    assert!(matches(&value, &Value::object([("at", Value::date(5.0))])));
    assert!(!matches(&value, &Value::object([("at", Value::date(6.0))])));
}

// ---------- Arguments ----------

#[test]
fn arguments_match_arrays_both_ways() {
    let args = Value::arguments(vec![1.into(), 2.into(), 3.into()]);
    let arr = js(json!([1, 2, 3]));
    assert!(matches(&args, &arr));
    assert!(matches(&arr, &args));
    assert!(!matches(&args, &js(json!([1, 2, 4]))));
}

#[test]
fn arguments_match_arguments() {
    let a = Value::arguments(vec!["x".into(), js(json!({"k": 1}))]);
    let b = Value::arguments(vec!["x".into(), js(json!({}))]);
    assert!(matches(&a, &b));
    assert!(!matches(&b, &a));
}

// ---------- Buffers ----------

#[test]
fn buffers_compare_bytes() {
    let a = Value::buffer(vec![1, 2, 3]);
    assert!(matches(&a, &Value::buffer(vec![1, 2, 3])));
    assert!(!matches(&a, &Value::buffer(vec![1, 2, 4])));
    assert!(!matches(&a, &Value::buffer(vec![1, 2])));
    assert!(!matches(&Value::buffer(vec![1, 2]), &a));
}

#[test]
fn buffers_compare_the_same_with_or_without_a_comparator() {
    fn slice_eq(a: &[u8], b: &[u8]) -> bool {
        a == b
    }
    let pairs = [
        (vec![], vec![]),
        (vec![0u8, 255], vec![0u8, 255]),
        (vec![1], vec![2]),
        (vec![1, 2, 3], vec![1, 2]),
    ];
    let with = Matcher::with_fast_equal(slice_eq);
    let without = Matcher::without_fast_equal();
    for (a, b) in pairs {
        let (a, b) = (Value::buffer(a), Value::buffer(b));
        assert_eq!(with.matches(&a, &b), without.matches(&a, &b));
    }
}
