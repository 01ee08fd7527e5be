#![no_main]

use libfuzzer_sys::fuzz_target;
use tmatch::{Value, matches};

// Input: regex source, NUL, flags, NUL, subject. Compilation may fail but
// must not panic, and testing a compiled pattern must not panic either.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut parts = text.splitn(3, '\0');
    let (Some(source), Some(flags), Some(subject)) = (parts.next(), parts.next(), parts.next())
    else {
        return;
    };
    let Ok(pattern) = Value::regex(source, flags) else {
        return;
    };
    let subject = Value::string(subject);
    let _ = matches(&subject, &pattern);
    let _ = matches(&subject, &pattern);
});
