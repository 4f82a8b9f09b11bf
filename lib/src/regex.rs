use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

use bitflags::bitflags;
use log::*;
use serde::{Deserialize, Serialize};

use crate::matcher::Matcher;
use crate::re::engine::{self, Cache, Input};
use crate::re::parser::Parser;
use crate::re::thompson::{Compiler, Program, ProgramFlagSet, ProgramFlags};
use crate::re::{Captures, Error, DEFAULT_NEST_LIMIT, DEFAULT_SIZE_LIMIT};

bitflags! {
    /// Flags that change how a [`Regex`] is interpreted.
    ///
    /// The numeric values of the flags are stable, they are the ones used
    /// when a [`Regex`] is serialized.
    #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Case insensitive matching, as with `(?i)`.
        const CASE_INSENSITIVE       = 0x01;
        /// `.` matches any character including `\n`, as with `(?s)`.
        const DOTALL                 = 0x02;
        /// `^` and `$` match at the beginning and end of lines, not only
        /// at the beginning and end of the input, as with `(?m)`.
        const MULTILINE              = 0x04;
        /// Unicode classes like `\p{Greek}` are syntax errors.
        const DISABLE_UNICODE_GROUPS = 0x08;
        /// Matches the longest possible string instead of the first one in
        /// priority order.
        const LONGEST_MATCH          = 0x10;
        /// `\b` and `\B` use Unicode word characters.
        const UNICODE_WORD_BOUNDARY  = 0x20;
    }
}

impl TryFrom<u32> for Flags {
    type Error = Error;

    /// Converts raw bits into [`Flags`], failing with
    /// [`Error::InvalidFlags`] if any bit doesn't correspond to a flag.
    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Flags::from_bits(bits).ok_or(Error::InvalidFlags(bits))
    }
}

/// Builds a [`Regex`] with non-default options.
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    flags: Flags,
    size_limit: usize,
    nest_limit: u32,
}

impl RegexBuilder {
    /// Creates a builder for the given pattern, with no flags and the
    /// default limits.
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            flags: Flags::empty(),
            size_limit: DEFAULT_SIZE_LIMIT,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }

    /// Replaces all the flags.
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.flags.set(Flags::CASE_INSENSITIVE, yes);
        self
    }

    pub fn dot_all(mut self, yes: bool) -> Self {
        self.flags.set(Flags::DOTALL, yes);
        self
    }

    pub fn multi_line(mut self, yes: bool) -> Self {
        self.flags.set(Flags::MULTILINE, yes);
        self
    }

    pub fn longest_match(mut self, yes: bool) -> Self {
        self.flags.set(Flags::LONGEST_MATCH, yes);
        self
    }

    /// Maximum number of instructions in the compiled program.
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Maximum nesting depth of groups and classes in the pattern.
    pub fn nest_limit(mut self, limit: u32) -> Self {
        self.nest_limit = limit;
        self
    }

    /// Parses and compiles the pattern.
    pub fn build(&self) -> Result<Regex, Error> {
        let flags = self.flags;

        // Flags are passed to the parser as its initial state instead of
        // prepending something like `(?i)` to the pattern. This way the
        // positions in syntax errors are relative to the pattern as written
        // by the user.
        let ast = Parser::new()
            .case_insensitive(flags.contains(Flags::CASE_INSENSITIVE))
            .dot_matches_new_line(flags.contains(Flags::DOTALL))
            .multi_line(flags.contains(Flags::MULTILINE))
            .unicode_groups(!flags.contains(Flags::DISABLE_UNICODE_GROUPS))
            .unicode_word_boundary(
                flags.contains(Flags::UNICODE_WORD_BOUNDARY),
            )
            .nest_limit(self.nest_limit)
            .parse(&self.pattern)?;

        let mut program_flags = ProgramFlagSet::none();

        for (flag, program_flag) in [
            (Flags::CASE_INSENSITIVE, ProgramFlags::CaseInsensitive),
            (Flags::DOTALL, ProgramFlags::DotMatchesNewLine),
            (Flags::MULTILINE, ProgramFlags::MultiLine),
            (Flags::LONGEST_MATCH, ProgramFlags::LongestMatch),
        ] {
            if flags.contains(flag) {
                program_flags.set(program_flag);
            }
        }

        let program = Compiler::new()
            .size_limit(self.size_limit)
            .flags(program_flags)
            .compile(&ast)?;

        info!(
            "compiled regexp `{}` ({} instructions)",
            self.pattern,
            program.len()
        );

        Ok(Regex {
            pattern: self.pattern.clone(),
            flags,
            program: Arc::new(program),
        })
    }
}

/// A compiled regular expression.
///
/// Compiling a regular expression is expensive, but the result can be
/// used for any number of searches. `Regex` is cheap to clone and can be
/// shared between threads, every clone uses the same compiled program.
///
/// Two regular expressions are equal if they have the same pattern and
/// flags.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RegexRepr", into = "RegexRepr")]
pub struct Regex {
    pattern: String,
    flags: Flags,
    program: Arc<Program>,
}

/// Serialized form of a [`Regex`]. The program is compiled again when
/// deserializing.
#[derive(Serialize, Deserialize)]
struct RegexRepr {
    pattern: String,
    flags: u32,
}

impl TryFrom<RegexRepr> for Regex {
    type Error = Error;

    fn try_from(repr: RegexRepr) -> Result<Self, Self::Error> {
        Regex::with_flags(&repr.pattern, Flags::try_from(repr.flags)?)
    }
}

impl From<Regex> for RegexRepr {
    fn from(regex: Regex) -> Self {
        RegexRepr { pattern: regex.pattern, flags: regex.flags.bits() }
    }
}

impl Regex {
    /// Compiles a regular expression with no flags.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        RegexBuilder::new(pattern).build()
    }

    /// Compiles a regular expression with the given flags.
    pub fn with_flags(pattern: &str, flags: Flags) -> Result<Self, Error> {
        RegexBuilder::new(pattern).flags(flags).build()
    }

    /// The pattern as passed when the regexp was created.
    #[inline]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The compiled program.
    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Number of instructions in the compiled program. This is a rough
    /// measure of how expensive the regexp is.
    #[inline]
    pub fn program_size(&self) -> usize {
        self.program.len()
    }

    /// Number of capture groups, not counting the group that spans the whole
    /// match.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.program.group_count()
    }

    /// Iterator over the names of the capture groups and their indexes,
    /// sorted by index.
    pub fn named_groups(&self) -> impl Iterator<Item = (&str, usize)> {
        let mut groups: Vec<_> = self
            .program
            .group_names()
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
            .collect();
        groups.sort_by_key(|(_, index)| *index);
        groups.into_iter()
    }

    /// Returns true if the regexp matches somewhere in `haystack`.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.search(&Input::new(haystack).captures(false)).is_some()
    }

    /// Returns true if the regexp matches the whole `haystack`.
    pub fn matches(&self, haystack: &str) -> bool {
        self.search(
            &Input::new(haystack)
                .anchored_start(true)
                .anchored_end(true)
                .captures(false),
        )
        .is_some()
    }

    /// Returns the span of the first match in `haystack`.
    pub fn find(&self, haystack: &str) -> Option<Range<usize>> {
        self.find_at(haystack, 0)
    }

    /// Returns the span of the first match in `haystack` that starts at
    /// offset `start` or later. The bytes before `start` are taken into
    /// account by assertions like `\b`.
    pub fn find_at(
        &self,
        haystack: &str,
        start: usize,
    ) -> Option<Range<usize>> {
        self.search(&Input::new(haystack).start_at(start).captures(false))
            .map(|captures| captures.span())
    }

    /// Returns the capture groups of the first match in `haystack`.
    pub fn captures(&self, haystack: &str) -> Option<Captures> {
        self.search(&Input::new(haystack))
    }

    /// Runs a search described by `input`.
    pub fn search(&self, input: &Input) -> Option<Captures> {
        engine::search(&self.program, &mut Cache::new(), input)
    }

    /// Like [`Regex::search`], but reuses the scratch space in `cache`.
    pub fn search_with_cache(
        &self,
        cache: &mut Cache,
        input: &Input,
    ) -> Option<Captures> {
        engine::search(&self.program, cache, input)
    }

    /// Creates a [`Matcher`] that finds the matches of this regexp in
    /// `input`.
    pub fn matcher<'h>(&self, input: &'h str) -> Matcher<'h> {
        Matcher::new(self.clone(), input)
    }

    /// Splits `input` around the matches of this regexp. Trailing empty
    /// strings are removed.
    pub fn split<'h>(&self, input: &'h str) -> Vec<&'h str> {
        self.splitn(input, 0)
    }

    /// Splits `input` around the matches of this regexp.
    ///
    /// If `limit` is greater than zero, at most `limit` strings are
    /// returned and the last one contains the rest of the input, including
    /// any other matches of the regexp. If `limit` is zero there's no limit,
    /// and empty strings at the end of the result are removed. If `limit`
    /// is negative there's no limit and nothing is removed.
    ///
    /// An empty match at the beginning of the input never produces an empty
    /// leading string.
    pub fn splitn<'h>(&self, input: &'h str, limit: i32) -> Vec<&'h str> {
        let mut result = Vec::new();
        let mut matcher = self.matcher(input);
        let mut empties_skipped = 0;
        let mut last = 0;

        while let Some(m) = matcher.find() {
            if last == 0 && m.end == 0 {
                last = m.end;
                continue;
            }

            if limit > 0 && result.len() == (limit - 1) as usize {
                break;
            }

            if last == m.start {
                if limit == 0 {
                    // Empty piece, which may or may not be trailing.
                    empties_skipped += 1;
                    last = m.end;
                    continue;
                }
            } else {
                for _ in 0..empties_skipped {
                    result.push("");
                }
                empties_skipped = 0;
            }

            result.push(&input[last..m.start]);
            last = m.end;
        }

        if limit == 0 && last != input.len() {
            for _ in 0..empties_skipped {
                result.push("");
            }
            result.push(&input[last..]);
        }

        if limit != 0 || result.is_empty() {
            result.push(&input[last..]);
        }

        result
    }

    /// Returns a pattern that matches `text` literally.
    pub fn quote(text: &str) -> String {
        let mut quoted = String::with_capacity(text.len());
        for c in text.chars() {
            if r"\.+*?()|[]{}^$".contains(c) {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted
    }
}

impl PartialEq for Regex {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags && self.pattern == other.pattern
    }
}

impl Eq for Regex {}

impl Hash for Regex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.flags.hash(state);
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl Debug for Regex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regex")
            .field("pattern", &self.pattern)
            .field("flags", &self.flags)
            .finish()
    }
}
