#![no_main]

use libfuzzer_sys::fuzz_target;
use tmatch::{Value, matches};

// Input: two JSON documents separated by a NUL byte. Matching must always
// terminate with a boolean, and every value must match itself.
fuzz_target!(|data: &[u8]| {
    let mut parts = data.splitn(2, |&b| b == 0);
    let (Some(left), Some(right)) = (parts.next(), parts.next()) else {
        return;
    };
    let (Ok(left), Ok(right)) = (
        serde_json::from_slice::<serde_json::Value>(left),
        serde_json::from_slice::<serde_json::Value>(right),
    ) else {
        return;
    };

    let value = Value::from(&left);
    let pattern = Value::from(&right);
    let _ = matches(&value, &pattern);
    let _ = matches(&pattern, &value);
    assert!(matches(&value, &value));

    // Close a cycle through the value and match again.
    if value.set("__self", value.clone()).is_ok() {
        let _ = matches(&value, &pattern);
        let _ = matches(&pattern, &value);
        assert!(matches(&value, &value));
        // Break the cycle so the graph is freed.
        let _ = value.set("__self", Value::Null);
    }
});
