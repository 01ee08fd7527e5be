//! The matcher: does a value look like a pattern?
//!
//! Matching is loose and asymmetric. Primitives compare with loose
//! equality, strings can be tested against regular expressions, and an
//! object matches when every field of the pattern matches the value's field
//! of the same name. Extra fields on the value are ignored.
//!
//! ## Decision order
//!
//! The first rule that applies decides:
//!
//! 1. both primitives: loose equality
//! 2. either is `null`: loose equality
//! 3. string value, regex pattern: regex test
//! 4. object vs primitive: no match
//! 5. two buffers: byte equality
//! 6. two dates: same epoch milliseconds
//! 7. two regexes: same source, `global`, `multiline`, `last_index`, `ignore_case`
//! 8. either is an argument list: compare both as plain arrays
//! 9. otherwise: field-wise containment, with a visited-pairs ledger so that
//!    cyclic graphs terminate

use tracing::{debug, trace};

use crate::coerce::loose_eq;
use crate::fast_equal::{ByteComparator, FastEqual, buffers_equal};
use crate::value::Value;
use crate::visited::VisitedPairs;

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    fast_equal: FastEqual,
}

impl Matcher {
    /// A matcher that uses the process-wide byte comparator when one is
    /// installed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fast_equal(comparator: ByteComparator) -> Self {
        Self {
            fast_equal: FastEqual::Fixed(comparator),
        }
    }

    pub fn without_fast_equal() -> Self {
        Self {
            fast_equal: FastEqual::Disabled,
        }
    }

    pub fn matches(&self, value: &Value, pattern: &Value) -> bool {
        let mut visited = VisitedPairs::new();
        let result = self.match_with_visited(value, pattern, &mut visited);
        trace!(
            value = value.type_name(),
            pattern = pattern.type_name(),
            result,
            "match"
        );
        result
    }

    fn match_with_visited(&self, value: &Value, pattern: &Value, visited: &mut VisitedPairs) -> bool {
        if !value.is_object() && !pattern.is_object() {
            return loose_eq(value, pattern);
        }

        if matches!(value, Value::Null) || matches!(pattern, Value::Null) {
            return loose_eq(value, pattern);
        }

        if let (Value::String(s), Value::Regex(re)) = (value, pattern) {
            return re.test(s);
        }

        if !value.is_object() || !pattern.is_object() {
            return false;
        }

        match (value, pattern) {
            (Value::Buffer(a), Value::Buffer(b)) => buffers_equal(self.fast_equal, a, b),
            // NaN epochs (invalid dates) never match.
            (Value::Date(a), Value::Date(b)) => a.epoch_ms() == b.epoch_ms(),
            (Value::Regex(a), Value::Regex(b)) => a.same_components(b),
            (Value::Arguments(_), _) | (_, Value::Arguments(_)) => {
                trace!("comparing argument list as array");
                let value = value.to_sequence();
                let pattern = pattern.to_sequence();
                self.match_with_visited(&value, &pattern, visited)
            }
            _ => self.match_fields(value, pattern, visited),
        }
    }

    /// Every pattern field must match the value's field of the same name.
    fn match_fields(&self, value: &Value, pattern: &Value, visited: &mut VisitedPairs) -> bool {
        let value_count = value.own_key_count();
        let pattern_keys = pattern.own_keys();

        if value_count == 0 && pattern_keys.is_empty() {
            return true;
        }

        // The pattern can't ask for more fields than the value has.
        if value_count < pattern_keys.len() {
            trace!(value_count, pattern_count = pattern_keys.len(), "pattern has more fields");
            return false;
        }

        let (Some(value_id), Some(pattern_id)) = (value.identity(), pattern.identity()) else {
            return false;
        };

        // Already comparing this exact pair further up: the cycle is consistent.
        if visited.contains(value_id, pattern_id) {
            debug!(?value_id, ?pattern_id, "cycle guard hit");
            return true;
        }
        visited.push(value_id, pattern_id);

        for key in pattern_keys.iter().rev() {
            if !self.match_with_visited(&value.get(key), &pattern.get(key), visited) {
                return false;
            }
        }

        visited.pop();
        true
    }
}
