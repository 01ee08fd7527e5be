//! Regular-expression values.
//!
//! Patterns are written in the JavaScript dialect (source text plus flag
//! letters) and compiled with `fancy-regex`, which supports the lookaround
//! and backreference syntax that the plain `regex` crate rejects.

use std::cell::Cell;
use std::fmt;

use anyhow::{Context, Result, bail};

/// Flag letters accepted after a pattern's source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub sticky: bool,
}

impl RegexFlags {
    /// Parse a flag string like `"gi"`. Unknown or repeated letters are an error.
    pub fn parse(flags: &str) -> Result<Self> {
        let mut parsed = RegexFlags::default();
        for ch in flags.chars() {
            let slot = match ch {
                'g' => &mut parsed.global,
                'i' => &mut parsed.ignore_case,
                'm' => &mut parsed.multiline,
                's' => &mut parsed.dot_all,
                'u' => &mut parsed.unicode,
                'y' => &mut parsed.sticky,
                other => bail!("invalid regular expression flag `{other}` in `{flags}`"),
            };
            if *slot {
                bail!("duplicate regular expression flag `{ch}` in `{flags}`");
            }
            *slot = true;
        }
        Ok(parsed)
    }
}

impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, letter) in [
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multiline, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
            (self.sticky, 'y'),
        ] {
            if set {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

pub struct RegexValue {
    source: String,
    flags: RegexFlags,
    /// Search position for global and sticky expressions, in chars.
    last_index: Cell<usize>,
    compiled: fancy_regex::Regex,
}

impl RegexValue {
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        let flags = RegexFlags::parse(flags)?;
        // An empty pattern is spelled as an empty non-capturing group.
        let source = if source.is_empty() { "(?:)" } else { source };
        let compiled = compile(source, flags)
            .with_context(|| format!("invalid regular expression /{source}/{flags}"))?;
        Ok(Self {
            source: source.to_string(),
            flags,
            last_index: Cell::new(0),
            compiled,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    pub fn last_index(&self) -> usize {
        self.last_index.get()
    }

    pub fn set_last_index(&self, index: usize) {
        self.last_index.set(index);
    }

    /// Test whether the expression matches `input`.
    ///
    /// Global and sticky expressions search from `last_index` and move it
    /// past the match, or reset it to 0 when nothing matches. Engine errors
    /// (e.g. backtrack limit) count as no match.
    pub fn test(&self, input: &str) -> bool {
        if !self.flags.global && !self.flags.sticky {
            return self.compiled.is_match(input).unwrap_or(false);
        }

        let Some(start) = char_to_byte(input, self.last_index.get()) else {
            self.last_index.set(0);
            return false;
        };
        let found = match self.compiled.find_from_pos(input, start) {
            Ok(Some(m)) if !self.flags.sticky || m.start() == start => Some(m.end()),
            _ => None,
        };
        match found {
            Some(end) => {
                self.last_index.set(input[..end].chars().count());
                true
            }
            None => {
                self.last_index.set(0);
                false
            }
        }
    }

    /// Component-wise equality: source text, `global`, `multiline`,
    /// `ignore_case` and `last_index`. Other flags are not compared.
    pub fn same_components(&self, other: &RegexValue) -> bool {
        self.source == other.source
            && self.flags.global == other.flags.global
            && self.flags.multiline == other.flags.multiline
            && self.last_index.get() == other.last_index.get()
            && self.flags.ignore_case == other.flags.ignore_case
    }
}

impl fmt::Display for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl fmt::Debug for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn compile(source: &str, flags: RegexFlags) -> Result<fancy_regex::Regex> {
    let mut inline = String::new();
    if flags.ignore_case {
        inline.push('i');
    }
    if flags.multiline {
        inline.push('m');
    }
    if flags.dot_all {
        inline.push('s');
    }

    let pattern = translate_source(source);
    let pattern = if inline.is_empty() {
        pattern
    } else {
        format!("(?{inline}){pattern}")
    };
    Ok(fancy_regex::Regex::new(&pattern)?)
}

/// Rewrite JS-only syntax the Rust engines reject or read differently.
/// `\/` is only needed inside a regex literal and means a plain slash.
/// `\d` and `\w` are ASCII-only in JS but Unicode-aware here, so they are
/// spelled out as ASCII ranges. Negated `\D` and `\W` inside a bracket class
/// and the `\b` boundary keep the engine's Unicode reading.
fn translate_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_class = false;
    let mut chars = source.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            match ch {
                '[' => in_class = true,
                ']' => in_class = false,
                _ => {}
            }
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some('d') if in_class => out.push_str(ASCII_DIGIT),
            Some('w') if in_class => out.push_str(ASCII_WORD),
            Some('d') => out.push_str(&format!("[{ASCII_DIGIT}]")),
            Some('w') => out.push_str(&format!("[{ASCII_WORD}]")),
            Some('D') if !in_class => out.push_str(&format!("[^{ASCII_DIGIT}]")),
            Some('W') if !in_class => out.push_str(&format!("[^{ASCII_WORD}]")),
            Some(escaped) => {
                out.push('\\');
                out.push(escaped);
            }
            None => out.push('\\'),
        }
    }
    out
}

const ASCII_DIGIT: &str = "0-9";
const ASCII_WORD: &str = "0-9A-Za-z_";

/// Byte offset of the `index`-th char, or `None` past the end.
fn char_to_byte(input: &str, index: usize) -> Option<usize> {
    if index == 0 {
        return Some(0);
    }
    let mut seen = 0;
    for (offset, _) in input.char_indices() {
        if seen == index {
            return Some(offset);
        }
        seen += 1;
    }
    (seen == index).then_some(input.len())
}
