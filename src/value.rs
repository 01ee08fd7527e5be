//! Discriminated runtime value representation.
//!
//! `Value` models the dynamically typed values the matcher compares. Object
//! cases (`Date`, `Regex`, `Buffer`, `Arguments`, `Array`, `Object`) are
//! reference counted so they carry a stable identity, and the container
//! cases use interior mutability so that cyclic graphs can be built.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use anyhow::{Result, bail};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use indexmap::IndexMap;

use crate::regexp::RegexValue;

/// Own properties of a plain object, in insertion order.
pub type Entries = IndexMap<String, Value>;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    /// A function reference. Two functions are equal only if they are the
    /// same reference.
    Function(Rc<FunctionRef>),
    Date(Rc<DateValue>),
    Regex(Rc<RegexValue>),
    Buffer(Rc<[u8]>),
    /// An array-like argument list that is not itself an array.
    Arguments(Rc<RefCell<Vec<Value>>>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<Entries>>),
}

/// Reference identity of an object value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(*const ());

#[derive(Debug)]
pub struct FunctionRef {
    name: String,
}

impl FunctionRef {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A point in time, stored as milliseconds since the Unix epoch.
/// `NaN` represents an invalid date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateValue {
    epoch_ms: f64,
}

impl DateValue {
    pub fn new(epoch_ms: f64) -> Self {
        Self { epoch_ms }
    }

    pub fn epoch_ms(&self) -> f64 {
        self.epoch_ms
    }

    /// `None` for invalid or out-of-range dates.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.epoch_ms.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis(self.epoch_ms as i64)
    }
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    /// Create a new, distinct function reference.
    pub fn function(name: impl Into<String>) -> Value {
        Value::Function(Rc::new(FunctionRef { name: name.into() }))
    }

    pub fn date(epoch_ms: f64) -> Value {
        Value::Date(Rc::new(DateValue::new(epoch_ms)))
    }

    pub fn date_from<Tz: TimeZone>(dt: &DateTime<Tz>) -> Value {
        Value::date(dt.timestamp_millis() as f64)
    }

    /// Compile a regular expression from its source text and flag letters
    /// (any of `gimsuy`).
    pub fn regex(source: &str, flags: &str) -> Result<Value> {
        Ok(Value::Regex(Rc::new(RegexValue::new(source, flags)?)))
    }

    pub fn buffer(bytes: impl Into<Vec<u8>>) -> Value {
        let bytes: Vec<u8> = bytes.into();
        Value::Buffer(bytes.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn arguments(items: Vec<Value>) -> Value {
        Value::Arguments(Rc::new(RefCell::new(items)))
    }

    pub fn object<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn empty_object() -> Value {
        Value::Object(Rc::new(RefCell::new(Entries::new())))
    }

    /// Set an own property on a plain object. Setting a property to the
    /// object itself creates a cycle.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        match self {
            Value::Object(entries) => {
                entries.borrow_mut().insert(key, value);
                Ok(())
            }
            other => bail!("cannot set property `{key}` on {}", other.type_name()),
        }
    }

    /// Append an element to an array or argument list.
    pub fn push(&self, value: Value) -> Result<()> {
        match self {
            Value::Array(items) | Value::Arguments(items) => {
                items.borrow_mut().push(value);
                Ok(())
            }
            other => bail!("cannot push onto {}", other.type_name()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Date(_) => "date",
            Value::Regex(_) => "regexp",
            Value::Buffer(_) => "buffer",
            Value::Arguments(_) => "arguments",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Whether the value is of object type. `Null` counts as an object and
    /// functions do not.
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Date(_)
                | Value::Regex(_)
                | Value::Buffer(_)
                | Value::Arguments(_)
                | Value::Array(_)
                | Value::Object(_)
        )
    }

    /// Reference identity for object cases other than `Null`.
    pub fn identity(&self) -> Option<Identity> {
        let ptr = match self {
            Value::Date(d) => Rc::as_ptr(d).cast::<()>(),
            Value::Regex(r) => Rc::as_ptr(r).cast::<()>(),
            Value::Buffer(b) => Rc::as_ptr(b).cast::<()>(),
            Value::Arguments(items) | Value::Array(items) => Rc::as_ptr(items).cast::<()>(),
            Value::Object(entries) => Rc::as_ptr(entries).cast::<()>(),
            _ => return None,
        };
        Some(Identity(ptr))
    }

    /// Number of own enumerable keys.
    pub fn own_key_count(&self) -> usize {
        match self {
            Value::Object(entries) => entries.borrow().len(),
            Value::Array(items) | Value::Arguments(items) => items.borrow().len(),
            Value::Buffer(bytes) => bytes.len(),
            _ => 0,
        }
    }

    /// Own enumerable keys in enumeration order: array-index keys first in
    /// ascending order, then the remaining keys in insertion order. Indexed
    /// containers list their indices as decimal strings.
    pub fn own_keys(&self) -> Vec<String> {
        match self {
            Value::Object(entries) => {
                let entries = entries.borrow();
                let mut indices: Vec<(usize, &String)> = entries
                    .keys()
                    .filter_map(|k| parse_array_index(k).map(|i| (i, k)))
                    .collect();
                indices.sort_unstable_by_key(|&(i, _)| i);
                let mut keys: Vec<String> = indices.into_iter().map(|(_, k)| k.clone()).collect();
                keys.extend(
                    entries
                        .keys()
                        .filter(|k| parse_array_index(k).is_none())
                        .cloned(),
                );
                keys
            }
            Value::Array(_) | Value::Arguments(_) | Value::Buffer(_) => {
                (0..self.own_key_count()).map(|i| i.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Property lookup. Missing properties are `Undefined`; indexed
    /// containers also answer `length`.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(entries) => entries.borrow().get(key).cloned().unwrap_or(Value::Undefined),
            Value::Array(items) | Value::Arguments(items) => {
                let items = items.borrow();
                if key == "length" {
                    return Value::Number(items.len() as f64);
                }
                parse_index(key)
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or(Value::Undefined)
            }
            Value::Buffer(bytes) => {
                if key == "length" {
                    return Value::Number(bytes.len() as f64);
                }
                parse_index(key)
                    .and_then(|i| bytes.get(i))
                    .map(|&b| Value::Number(b as f64))
                    .unwrap_or(Value::Undefined)
            }
            _ => Value::Undefined,
        }
    }

    /// Slice an array-like value into a plain element list, dropping any
    /// non-indexed properties.
    ///
    /// A plain object keeps only its index keys below its numeric `length`.
    /// Absent indices stay holes, so the result is an object whose keys are
    /// the present indices in ascending order. No slot is allocated for a
    /// hole, whatever the `length`.
    pub fn to_sequence(&self) -> Value {
        match self {
            Value::Array(items) | Value::Arguments(items) => Value::array(items.borrow().clone()),
            Value::Buffer(bytes) => {
                Value::array(bytes.iter().map(|&b| Value::Number(b as f64)).collect())
            }
            Value::Object(entries) => {
                let len = match self.get("length") {
                    Value::Number(n) if n > 0.0 => n,
                    _ => return Value::array(Vec::new()),
                };
                let mut present: Vec<(usize, Value)> = entries
                    .borrow()
                    .iter()
                    .filter_map(|(k, v)| parse_index(k).map(|i| (i, v.clone())))
                    .filter(|&(i, _)| (i as f64) < len)
                    .collect();
                present.sort_unstable_by_key(|&(i, _)| i);
                Value::object(present.into_iter().map(|(i, v)| (i.to_string(), v)))
            }
            _ => Value::array(Vec::new()),
        }
    }
}

/// Parse a canonical array index (no sign, no leading zeros).
fn parse_index(key: &str) -> Option<usize> {
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// An index key that plain objects enumerate before their other keys.
fn parse_array_index(key: &str) -> Option<usize> {
    parse_index(key).filter(|&i| i < u32::MAX as usize)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seen = RefCell::new(Vec::new());
        fmt::Debug::fmt(&DebugValue { value: self, seen: &seen }, f)
    }
}

/// Debug adapter that prints `[Circular]` for containers already being
/// printed further up.
struct DebugValue<'a> {
    value: &'a Value,
    seen: &'a RefCell<Vec<Identity>>,
}

impl DebugValue<'_> {
    fn child<'b>(&'b self, value: &'b Value) -> DebugValue<'b> {
        DebugValue { value, seen: self.seen }
    }
}

impl fmt::Debug for DebugValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = match self.value {
            Value::Arguments(_) | Value::Array(_) | Value::Object(_) => self.value.identity(),
            _ => None,
        };
        if let Some(id) = identity {
            if self.seen.borrow().contains(&id) {
                return f.write_str("[Circular]");
            }
            self.seen.borrow_mut().push(id);
        }

        let result = match self.value {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Function(func) => write!(f, "[Function: {}]", func.name()),
            Value::Date(d) => match d.to_datetime() {
                Some(dt) => write!(f, "Date({})", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => f.write_str("Date(Invalid Date)"),
            },
            Value::Regex(re) => write!(f, "{re}"),
            Value::Buffer(bytes) => write!(f, "Buffer({bytes:02x?})"),
            Value::Arguments(items) => {
                f.write_str("Arguments ")?;
                f.debug_list()
                    .entries(items.borrow().iter().map(|v| self.child(v)))
                    .finish()
            }
            Value::Array(items) => f
                .debug_list()
                .entries(items.borrow().iter().map(|v| self.child(v)))
                .finish(),
            Value::Object(entries) => f
                .debug_map()
                .entries(entries.borrow().iter().map(|(k, v)| (k, self.child(v))))
                .finish(),
        };

        if identity.is_some() {
            self.seen.borrow_mut().pop();
        }
        result
    }
}
