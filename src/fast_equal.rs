//! Pluggable fast path for byte-buffer equality.
//!
//! A comparator can be installed once per process with
//! [`install_fast_equal`], or injected into a single
//! [`Matcher`](crate::Matcher). Without one, buffers are compared with a
//! length check and a byte loop. A correct comparator never changes a
//! match result, only how long it takes.

use std::sync::OnceLock;

use anyhow::{Result, anyhow};

/// Byte-equality function: `true` iff both buffers have the same length
/// and contents.
pub type ByteComparator = fn(&[u8], &[u8]) -> bool;

static FAST_EQUAL: OnceLock<ByteComparator> = OnceLock::new();

/// Install the process-wide comparator. The slot can only be set once and
/// should be set at startup, before any matching happens.
pub fn install_fast_equal(comparator: ByteComparator) -> Result<()> {
    FAST_EQUAL
        .set(comparator)
        .map_err(|_| anyhow!("a fast byte comparator is already installed"))
}

pub fn installed_fast_equal() -> Option<ByteComparator> {
    FAST_EQUAL.get().copied()
}

/// Where a matcher gets its byte comparator from.
#[derive(Debug, Clone, Copy, Default)]
pub enum FastEqual {
    /// Probe the process-wide slot on every buffer comparison.
    #[default]
    Process,
    Fixed(ByteComparator),
    /// Always use the byte loop.
    Disabled,
}

impl FastEqual {
    fn resolve(self) -> Option<ByteComparator> {
        match self {
            FastEqual::Process => installed_fast_equal(),
            FastEqual::Fixed(comparator) => Some(comparator),
            FastEqual::Disabled => None,
        }
    }
}

pub fn buffers_equal(strategy: FastEqual, a: &[u8], b: &[u8]) -> bool {
    match strategy.resolve() {
        Some(comparator) => comparator(a, b),
        None => manual_equal(a, b),
    }
}

fn manual_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    for (x, y) in a.iter().zip(b) {
        if x != y {
            return false;
        }
    }
    true
}
