/*! This module parses, compiles, and executes regular expressions.

A regular expression goes through three stages. The [`parser`] turns the
pattern into an abstract syntax tree ([`ast::Ast`]), the [Thompson's
construction][1] compiler in [`thompson`] turns the tree into a program for
a byte-oriented virtual machine ([`thompson::Program`]), and finally one of
several engines executes the program against some input.

All engines produce exactly the same results, they only differ in cost:

* [`literal`]: used when the whole regexp is a literal string.
* [`onepass`]: a deterministic simulator for programs that never need to
  follow more than one path at a time. Used for anchored searches only.
* [`backtrack`]: a backtracker that memorizes every (instruction, position)
  pair it has visited, so it never explores the same state twice. It is
  used only when the program and the input are small enough for the memo
  to be cheap.
* `thompson::pikevm`: the Pike VM described in [Regular Expression
  Matching: the Virtual Machine Approach][2]. This one can be used with
  any program and any input, and runs in `O(program size × input length)`.

The [`engine`] module decides which one runs for a given search.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
[2]: https://swtch.com/~rsc/regexp/regexp2.html
*/

use std::ops::Range;

use thiserror::Error;

pub mod ast;
pub mod backtrack;
pub mod bitmapset;
pub mod engine;
pub mod literal;
pub mod onepass;
pub mod parser;
pub mod thompson;
pub mod unicode;

#[cfg(test)]
mod tests;

pub use parser::{ErrorKind, SyntaxError};

/// Maximum number of instructions in a compiled program. Compiling a regexp
/// that needs more instructions fails with [`Error::TooLarge`].
pub const DEFAULT_SIZE_LIMIT: usize = 100_000;

/// Maximum nesting depth of groups, classes and repetitions in a regexp.
pub const DEFAULT_NEST_LIMIT: u32 = 1000;

/// Maximum value accepted in counted repetitions like `a{n,m}`.
pub const MAX_REPEAT: u32 = 1000;

/// Errors returned while building a regular expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern is not a valid regular expression.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The compiled program would be too large.
    #[error("regexp too large: program exceeds {limit} instructions")]
    TooLarge { limit: usize },

    /// Some of the flags passed to the regexp are unknown.
    #[error("invalid flags: {0:#x}")]
    InvalidFlags(u32),
}

/// Zero-width assertions.
///
/// A look-around assertion doesn't consume any input, it only checks a
/// condition about the bytes surrounding the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Look {
    /// `\A`, or `^` when not in multi-line mode.
    StartText,
    /// `\z`, or `$` when not in multi-line mode.
    EndText,
    /// `^` in multi-line mode.
    StartLine,
    /// `$` in multi-line mode.
    EndLine,
    /// `\b` with ASCII word characters.
    WordAscii,
    /// `\B` with ASCII word characters.
    WordAsciiNegate,
    /// `\b` with Unicode word characters.
    WordUnicode,
    /// `\B` with Unicode word characters.
    WordUnicodeNegate,
}

impl Look {
    /// Returns true if the assertion holds at position `pos` of `haystack`.
    pub fn is_match(&self, haystack: &[u8], pos: usize) -> bool {
        match self {
            Look::StartText => pos == 0,
            Look::EndText => pos == haystack.len(),
            Look::StartLine => pos == 0 || haystack[pos - 1] == b'\n',
            Look::EndLine => {
                pos == haystack.len() || haystack[pos] == b'\n'
            }
            Look::WordAscii => is_word_boundary_ascii(haystack, pos),
            Look::WordAsciiNegate => !is_word_boundary_ascii(haystack, pos),
            Look::WordUnicode => is_word_boundary_unicode(haystack, pos),
            Look::WordUnicodeNegate => {
                !is_word_boundary_unicode(haystack, pos)
            }
        }
    }

    /// Short name used when printing programs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Look::StartText => "START_TEXT",
            Look::EndText => "END_TEXT",
            Look::StartLine => "START_LINE",
            Look::EndLine => "END_LINE",
            Look::WordAscii => "WORD_BOUNDARY",
            Look::WordAsciiNegate => "WORD_BOUNDARY_NEG",
            Look::WordUnicode => "WORD_BOUNDARY_UNICODE",
            Look::WordUnicodeNegate => "WORD_BOUNDARY_UNICODE_NEG",
        }
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

fn is_word_boundary_ascii(haystack: &[u8], pos: usize) -> bool {
    let before = pos > 0 && is_word_byte(haystack[pos - 1]);
    let after = pos < haystack.len() && is_word_byte(haystack[pos]);
    before != after
}

fn is_word_boundary_unicode(haystack: &[u8], pos: usize) -> bool {
    let before = match bstr::decode_last_utf8(&haystack[..pos]) {
        (Some(c), _) => unicode::is_word_char(c),
        (None, _) => false,
    };
    let after = match bstr::decode_utf8(&haystack[pos..]) {
        (Some(c), _) => unicode::is_word_char(c),
        (None, _) => false,
    };
    before != after
}

/// Returns true if a match can start at `pos`.
///
/// Matches never start in the middle of an UTF-8 encoded character, so the
/// positions occupied by continuation bytes are skipped.
#[inline]
pub(crate) fn is_char_boundary(haystack: &[u8], pos: usize) -> bool {
    match haystack.get(pos) {
        Some(b) => b & 0xC0 != 0x80,
        None => true,
    }
}

/// The result of a successful search.
///
/// Holds one pair of offsets per capture group, including group 0, which
/// spans the whole match. Offsets are byte positions within the haystack.
/// Groups that didn't participate in the match are unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captures {
    slots: Box<[Option<usize>]>,
}

impl Captures {
    pub(crate) fn new(slots: Box<[Option<usize>]>) -> Self {
        debug_assert!(slots.len() >= 2 && slots.len() % 2 == 0);
        Self { slots }
    }

    /// Number of groups, including group 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    /// Always false, group 0 is always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the span of group `i`, or `None` if the group didn't take
    /// part in the match (or doesn't exist).
    pub fn get(&self, i: usize) -> Option<Range<usize>> {
        match (self.slots.get(2 * i)?, self.slots.get(2 * i + 1)?) {
            (Some(start), Some(end)) => Some(*start..*end),
            _ => None,
        }
    }

    /// Span of the whole match.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.get(0).unwrap_or_default()
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.span().start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.span().end
    }

    /// Raw capture slots, two per group.
    #[inline]
    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Iterator over the spans of all groups, in group order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Range<usize>>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}
