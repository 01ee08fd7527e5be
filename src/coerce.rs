//! Loose (coercing) equality.
//!
//! The coercion table, in order:
//!
//! 1. Same kind: strict comparison. `NaN` is unequal to itself, `+0` equals
//!    `-0`, functions and object values compare by reference.
//! 2. `Null` and `Undefined` equal each other and nothing else.
//! 3. `Number` vs `String`: the string is converted with [`to_number`].
//! 4. `Bool` vs anything: the bool becomes `0` or `1` and the comparison
//!    is retried.
//! 5. Everything else is unequal. Objects are never converted to
//!    primitives, and a function never equals a non-function.

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use crate::value::Value;

static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,

        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),

        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            *n == to_number(s)
        }

        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            loose_eq(&Value::Number(bool_to_number(*flag)), other)
        }

        _ if a.is_object() && b.is_object() => a.identity() == b.identity(),
        _ => false,
    }
}

fn bool_to_number(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// String-to-number conversion used by loose equality.
///
/// Surrounding whitespace is ignored and an empty string is `0`. Accepts
/// decimal literals, `0x`/`0o`/`0b` integers and signed `Infinity`; anything
/// else is `NaN`.
pub fn to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(radix) = radix_prefix(trimmed) {
        return parse_radix(&trimmed[2..], radix);
    }

    if DECIMAL_LITERAL.is_match(trimmed) {
        return trimmed.parse().unwrap_or(f64::NAN);
    }

    f64::NAN
}

/// Whitespace and line terminators stripped before numeric conversion.
/// NEL (U+0085) is not whitespace here; the BOM is.
fn is_whitespace(ch: char) -> bool {
    ch == '\u{feff}' || (ch.is_whitespace() && ch != '\u{85}')
}

fn radix_prefix(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    match bytes[1] {
        b'x' | b'X' => Some(16),
        b'o' | b'O' => Some(8),
        b'b' | b'B' => Some(2),
        _ => None,
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut acc = 0.0;
    for ch in digits.chars() {
        match ch.to_digit(radix) {
            Some(d) => acc = acc * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    acc
}
