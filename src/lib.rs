//! Loose structural matching of runtime values against patterns.
//!
//! [`matches`] answers "does this value look like this pattern?" for
//! assertion libraries and test frameworks. A pattern may leave out fields
//! the value has, use regular expressions for strings, and relies on loose
//! equality for primitives:
//!
//! ```
//! use serde_json::json;
//! use tmatch::{Value, matches};
//!
//! let value = Value::from(json!({"name": "Alice", "age": 30, "tags": ["a", "b"]}));
//! let pattern = Value::from(json!({"age": "30", "tags": ["a"]}));
//! assert!(matches(&value, &pattern));
//!
//! let pattern = Value::object([("name", Value::regex("^al", "i").unwrap())]);
//! assert!(matches(&value, &pattern));
//! ```
//!
//! The result is a plain boolean; there is no explanation of why two values
//! failed to match.

pub mod coerce;
pub mod fast_equal;
pub mod json;
pub mod matcher;
pub mod regexp;
pub mod value;
mod visited;

pub use fast_equal::{ByteComparator, FastEqual, install_fast_equal, installed_fast_equal};
pub use matcher::Matcher;
pub use regexp::{RegexFlags, RegexValue};
pub use value::{DateValue, FunctionRef, Identity, Value};

/// Match `value` against `pattern` using the process-wide byte comparator,
/// if one is installed.
pub fn matches(value: &Value, pattern: &Value) -> bool {
    Matcher::new().matches(value, pattern)
}
