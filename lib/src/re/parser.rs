/*! Parser for regular expressions in RE2 syntax.

The parser is a recursive-descent parser that works directly on the pattern
text and produces an [`Ast`]. It doesn't support backreferences nor
look-around assertions, as they can't be matched in linear time.
*/

use std::fmt::{Display, Formatter};
use std::ops::Range;

use bitmask::bitmask;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::re::ast::{Ast, Capture, Class, ClassItem, Literal, Repetition};
use crate::re::{unicode, Look, DEFAULT_NEST_LIMIT, MAX_REPEAT};

bitmask! {
    /// Flags that change how the regexp is interpreted. These are the flags
    /// that can be turned on and off with `(?flags)` and `(?flags:re)`.
    #[derive(Debug, Hash)]
    pub mask ParseFlagSet: u8 where
    /// Each of the flags in a [`ParseFlagSet`].
    flags ParseFlags {
        /// `i`: letters match both upper and lower case.
        CaseInsensitive = 0x01,
        /// `s`: `.` matches `\n`.
        DotMatchesNewLine = 0x02,
        /// `m`: `^` and `$` match at the beginning and end of lines.
        MultiLine = 0x04,
        /// `U`: swaps the meaning of `x*` and `x*?`, `x+` and `x+?`, etc.
        SwapGreed = 0x08,
    }
}

/// Kinds of syntax errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateCaptureName,
    InvalidCharRange,
    InvalidEscape,
    InvalidNamedCapture,
    InvalidPerlOp,
    InvalidRepeatOp,
    InvalidRepeatSize,
    MissingBracket,
    MissingParen,
    MissingRepeatArgument,
    NestingDepth,
    TrailingBackslash,
    UnexpectedParen,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ErrorKind::DuplicateCaptureName => "duplicate capture group name",
            ErrorKind::InvalidCharRange => "invalid character class range",
            ErrorKind::InvalidEscape => "invalid escape sequence",
            ErrorKind::InvalidNamedCapture => "invalid named capture",
            ErrorKind::InvalidPerlOp => "invalid or unsupported Perl syntax",
            ErrorKind::InvalidRepeatOp => {
                "invalid nested repetition operator"
            }
            ErrorKind::InvalidRepeatSize => "invalid repeat count",
            ErrorKind::MissingBracket => "missing closing ]",
            ErrorKind::MissingParen => "missing closing )",
            ErrorKind::MissingRepeatArgument => {
                "missing argument to repetition operator"
            }
            ErrorKind::NestingDepth => "expression nests too deeply",
            ErrorKind::TrailingBackslash => {
                "trailing backslash at end of expression"
            }
            ErrorKind::UnexpectedParen => "unexpected )",
        };
        write!(f, "{}", msg)
    }
}

/// Error returned when the pattern is not a valid regular expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error parsing regexp: {kind}: `{fragment}`")]
pub struct SyntaxError {
    kind: ErrorKind,
    span: Range<usize>,
    fragment: String,
}

impl SyntaxError {
    fn new(kind: ErrorKind, pattern: &str, span: Range<usize>) -> Self {
        let fragment =
            pattern.get(span.clone()).unwrap_or(pattern).to_string();
        Self { kind, span, fragment }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset within the pattern where the error starts.
    #[inline]
    pub fn position(&self) -> usize {
        self.span.start
    }

    /// Byte range within the pattern covered by the error.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The piece of the pattern that caused the error.
    #[inline]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

/// Parses regular expressions and produces an [`Ast`].
#[derive(Clone, Debug)]
pub struct Parser {
    flags: ParseFlagSet,
    unicode_groups: bool,
    unicode_word_boundary: bool,
    nest_limit: u32,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Creates a new parser with the default options.
    pub fn new() -> Self {
        Self {
            flags: ParseFlagSet::none(),
            unicode_groups: true,
            unicode_word_boundary: false,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }

    /// Starts parsing with the `i` flag set.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.set_flag(ParseFlags::CaseInsensitive, yes);
        self
    }

    /// Starts parsing with the `s` flag set.
    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.set_flag(ParseFlags::DotMatchesNewLine, yes);
        self
    }

    /// Starts parsing with the `m` flag set.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.set_flag(ParseFlags::MultiLine, yes);
        self
    }

    /// Starts parsing with the `U` flag set.
    pub fn swap_greed(mut self, yes: bool) -> Self {
        self.set_flag(ParseFlags::SwapGreed, yes);
        self
    }

    /// Enables or disables Unicode classes like `\pL` and `\p{Greek}`. When
    /// disabled, `\p` and `\P` are invalid escape sequences.
    pub fn unicode_groups(mut self, yes: bool) -> Self {
        self.unicode_groups = yes;
        self
    }

    /// When enabled `\b` and `\B` use the Unicode definition of a word
    /// character instead of `[0-9A-Za-z_]`.
    pub fn unicode_word_boundary(mut self, yes: bool) -> Self {
        self.unicode_word_boundary = yes;
        self
    }

    /// Maximum nesting depth for groups and classes.
    pub fn nest_limit(mut self, limit: u32) -> Self {
        self.nest_limit = limit;
        self
    }

    /// Parses a regular expression.
    pub fn parse(&self, pattern: &str) -> Result<Ast> {
        ParserImpl {
            config: self,
            pattern,
            pos: 0,
            flags: self.flags,
            depth: 0,
            capture_index: 0,
            names: FxHashSet::default(),
        }
        .parse()
    }

    fn set_flag(&mut self, flag: ParseFlags, yes: bool) {
        if yes {
            self.flags.set(flag);
        } else {
            self.flags.unset(flag);
        }
    }
}

type Result<T> = std::result::Result<T, SyntaxError>;

struct ParserImpl<'a> {
    config: &'a Parser,
    pattern: &'a str,
    /// Current position within `pattern`, always at a char boundary.
    pos: usize,
    /// Flags in effect at the current position.
    flags: ParseFlagSet,
    /// Current nesting depth.
    depth: u32,
    /// Index of the last capture group opened.
    capture_index: u32,
    /// Names of the capture groups found so far.
    names: FxHashSet<String>,
}

impl<'a> ParserImpl<'a> {
    fn parse(mut self) -> Result<Ast> {
        let ast = self.parse_alternation()?;
        // The only reason for `parse_alternation` to stop before the end of
        // the pattern is finding a `)` that doesn't close any group.
        if self.pos < self.pattern.len() {
            return Err(self.error(
                ErrorKind::UnexpectedParen,
                self.pos..self.pos + 1,
            ));
        }
        Ok(ast)
    }

    fn parse_alternation(&mut self) -> Result<Ast> {
        let mut alternatives = vec![self.parse_concat()?];
        while self.eat('|') {
            alternatives.push(self.parse_concat()?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.remove(0))
        } else {
            Ok(Ast::Alternation(alternatives))
        }
    }

    fn parse_concat(&mut self) -> Result<Ast> {
        let mut items = Vec::new();

        loop {
            let start = self.pos;
            let atom = match self.peek() {
                None | Some('|') | Some(')') => break,
                Some('*') | Some('+') | Some('?') => {
                    return Err(self.error(
                        ErrorKind::MissingRepeatArgument,
                        start..start + 1,
                    ));
                }
                Some('{') if self.repeat_count_follows() => {
                    let end = self.pattern[start..]
                        .find('}')
                        .map_or(self.pattern.len(), |i| start + i + 1);
                    return Err(self.error(
                        ErrorKind::MissingRepeatArgument,
                        start..end,
                    ));
                }
                Some('\\') if self.rest().starts_with("\\Q") => {
                    match self.parse_quoted(&mut items) {
                        Some(last) => last,
                        None => continue,
                    }
                }
                _ => match self.parse_atom()? {
                    Some(atom) => atom,
                    // Flag groups like `(?i)` don't produce any node.
                    None => continue,
                },
            };
            let atom = self.parse_repetition(atom)?;
            push_folding(&mut items, atom);
        }

        Ok(match items.len() {
            0 => Ast::Empty,
            1 => items.remove(0),
            _ => Ast::Concat(items),
        })
    }

    /// Parses the text between `\Q` and `\E` (or the end of the pattern),
    /// which is taken literally. Every character except the last one is
    /// pushed into `items`, the last one is returned as an atom, so that a
    /// quantifier after `\E` applies to it alone.
    fn parse_quoted(&mut self, items: &mut Vec<Ast>) -> Option<Ast> {
        self.pos += 2;
        let rest = self.rest();
        let text = match rest.find("\\E") {
            Some(i) => &rest[..i],
            None => rest,
        };
        self.pos += text.len();
        if self.rest().starts_with("\\E") {
            self.pos += 2;
        }
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let lit = self.literal(c);
            if chars.peek().is_none() {
                return Some(lit);
            }
            push_folding(items, lit);
        }
        None
    }

    /// Parses an atom: a literal character, a class, a group, an escape
    /// sequence or an anchor. Returns `None` for flag groups like `(?i)`.
    fn parse_atom(&mut self) -> Result<Option<Ast>> {
        let start = self.pos;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };
        let ast = match c {
            '(' => return self.parse_group(start),
            '[' => Ast::Class(self.parse_class(start)?),
            '\\' => return self.parse_escape(start).map(Some),
            '.' => {
                if self.flags.contains(ParseFlags::DotMatchesNewLine) {
                    Ast::Class(Class::from_ranges([('\0', char::MAX)], false))
                } else {
                    Ast::Class(Class::from_ranges(
                        [('\0', '\x09'), ('\x0B', char::MAX)],
                        false,
                    ))
                }
            }
            '^' => Ast::Look(if self.flags.contains(ParseFlags::MultiLine) {
                Look::StartLine
            } else {
                Look::StartText
            }),
            '$' => Ast::Look(if self.flags.contains(ParseFlags::MultiLine) {
                Look::EndLine
            } else {
                Look::EndText
            }),
            c => self.literal(c),
        };
        Ok(Some(ast))
    }

    /// Parses the quantifiers that follow an atom, if any.
    fn parse_repetition(&mut self, atom: Ast) -> Result<Ast> {
        let mut atom = atom;
        let mut prev_op: Option<Range<usize>> = None;

        loop {
            let start = self.pos;
            let (min, max) = match self.peek() {
                Some('*') => {
                    self.bump();
                    (0, None)
                }
                Some('+') => {
                    self.bump();
                    (1, None)
                }
                Some('?') => {
                    self.bump();
                    (0, Some(1))
                }
                Some('{') => match self.parse_repeat_count()? {
                    Some(count) => count,
                    // Not a valid counted repetition, the `{` is a literal.
                    None => break,
                },
                _ => break,
            };

            let lazy = self.eat('?');

            // Quantifiers can't be stacked, as in `a**` or `a{2}*`.
            if let Some(prev) = prev_op {
                return Err(self.error(
                    ErrorKind::InvalidRepeatOp,
                    prev.start..self.pos,
                ));
            }
            prev_op = Some(start..self.pos);

            let greedy = lazy == self.flags.contains(ParseFlags::SwapGreed);

            atom = Ast::Repetition(Repetition {
                min,
                max,
                greedy,
                sub: Box::new(atom),
            });
        }

        Ok(atom)
    }

    /// Returns true if the text at the current position is a valid counted
    /// repetition like `{2}`, `{2,}` or `{2,5}`. The current position is
    /// not changed.
    fn repeat_count_follows(&self) -> bool {
        scan_repeat_count(self.rest()).is_some()
    }

    /// Parses a counted repetition like `{2}`, `{2,}` or `{2,5}`. Returns
    /// `None` without consuming anything if the text at the current
    /// position doesn't have the syntax of a counted repetition.
    fn parse_repeat_count(&mut self) -> Result<Option<(u32, Option<u32>)>> {
        let start = self.pos;
        let (len, min, max) = match scan_repeat_count(self.rest()) {
            Some(scanned) => scanned,
            None => return Ok(None),
        };
        self.pos += len;

        let invalid = || {
            Err(SyntaxError::new(
                ErrorKind::InvalidRepeatSize,
                self.pattern,
                start..start + len,
            ))
        };

        let min = match min {
            Some(min) if min <= MAX_REPEAT => min,
            _ => return invalid(),
        };

        let max = match max {
            RepeatMax::Exactly => Some(min),
            RepeatMax::Unbounded => None,
            RepeatMax::Bounded(Some(max))
                if max <= MAX_REPEAT && max >= min =>
            {
                Some(max)
            }
            RepeatMax::Bounded(_) => return invalid(),
        };

        Ok(Some((min, max)))
    }

    /// Parses a group. The opening parenthesis was already consumed.
    fn parse_group(&mut self, start: usize) -> Result<Option<Ast>> {
        self.enter_nesting(start)?;

        // Flags are restored when the group is closed, so that flags set
        // with `(?i)` inside the group don't affect what follows it.
        let saved_flags = self.flags;
        let mut capture = None;

        if self.eat('?') {
            let rest = self.rest();
            if rest.starts_with("P<")
                || (rest.starts_with('<')
                    && !rest.starts_with("<=")
                    && !rest.starts_with("<!"))
            {
                capture = Some(self.parse_capture_name(start)?);
            } else if !self.parse_flags(start)? {
                // `(?flags)` without colon modifies the flags for the rest
                // of the enclosing group.
                self.depth -= 1;
                return Ok(None);
            }
        } else {
            self.capture_index += 1;
            capture = Some((self.capture_index, None));
        }

        let sub = self.parse_alternation()?;

        if !self.eat(')') {
            return Err(
                self.error(ErrorKind::MissingParen, start..self.pattern.len())
            );
        }

        self.flags = saved_flags;
        self.depth -= 1;

        Ok(Some(match capture {
            Some((index, name)) => {
                Ast::Capture(Capture { index, name, sub: Box::new(sub) })
            }
            None => sub,
        }))
    }

    /// Parses the name in `(?P<name>` or `(?<name>`. The current position
    /// is right after the `?`.
    fn parse_capture_name(
        &mut self,
        start: usize,
    ) -> Result<(u32, Option<String>)> {
        if self.rest().starts_with('P') {
            self.pos += 1;
        }
        // Skip the `<`.
        self.pos += 1;

        let end = match self.rest().find('>') {
            Some(i) => self.pos + i,
            None => {
                return Err(self.error(
                    ErrorKind::InvalidNamedCapture,
                    start..self.pattern.len(),
                ))
            }
        };

        let name = &self.pattern[self.pos..end];
        self.pos = end + 1;

        if name.is_empty()
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(
                self.error(ErrorKind::InvalidNamedCapture, start..self.pos)
            );
        }

        if !self.names.insert(name.to_string()) {
            return Err(
                self.error(ErrorKind::DuplicateCaptureName, start..self.pos)
            );
        }

        self.capture_index += 1;
        Ok((self.capture_index, Some(name.to_string())))
    }

    /// Parses the flags in `(?flags)` or `(?flags:`. The current position
    /// is right after the `?`. Returns true if the flags are followed by a
    /// colon, which means that they apply only to the rest of the group.
    fn parse_flags(&mut self, start: usize) -> Result<bool> {
        let mut flags = self.flags;
        let mut negated = false;
        let mut seen_flag = false;

        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => {
                    return Err(self.error(
                        ErrorKind::MissingParen,
                        start..self.pattern.len(),
                    ))
                }
            };
            let flag = match c {
                'i' => ParseFlags::CaseInsensitive,
                's' => ParseFlags::DotMatchesNewLine,
                'm' => ParseFlags::MultiLine,
                'U' => ParseFlags::SwapGreed,
                '-' if !negated => {
                    negated = true;
                    // At least one flag must follow the `-`.
                    seen_flag = false;
                    continue;
                }
                // A bare `(?:` is a plain non-capturing group, but a `-`
                // must be followed by some flag.
                ':' if seen_flag || !negated => {
                    self.flags = flags;
                    return Ok(true);
                }
                ')' if seen_flag => {
                    self.flags = flags;
                    return Ok(false);
                }
                _ => {
                    return Err(
                        self.error(ErrorKind::InvalidPerlOp, start..self.pos)
                    )
                }
            };
            if negated {
                flags.unset(flag);
            } else {
                flags.set(flag);
            }
            seen_flag = true;
        }
    }

    /// Parses a bracketed class. The opening bracket was already consumed.
    fn parse_class(&mut self, start: usize) -> Result<Class> {
        self.enter_nesting(start)?;

        let fold = self.flags.contains(ParseFlags::CaseInsensitive);
        let mut class = Class::new(self.eat('^'), Vec::new());
        let mut first = true;

        loop {
            let item_start = self.pos;
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorKind::MissingBracket,
                        start..self.pattern.len(),
                    ))
                }
                // A `]` right after the `[` or `[^` is a literal.
                Some(']') if !first => {
                    self.bump();
                    break;
                }
                Some('[') if self.rest().starts_with("[:") => {
                    if let Some(posix) = self.parse_posix_class()? {
                        class.items.push(ClassItem::Class(posix));
                        first = false;
                        continue;
                    }
                }
                Some('\\') if self.class_escape_follows() => {
                    self.bump();
                    let nested = self.parse_class_escape(item_start)?;
                    class.items.push(ClassItem::Class(nested));
                    first = false;
                    continue;
                }
                _ => {}
            }

            let lo = self.parse_class_char(start)?;
            let mut hi = lo;

            // A `-` is a range operator except when it's the last character
            // in the class.
            if self.rest().starts_with('-') && !self.rest().starts_with("-]")
            {
                self.bump();
                if self.class_escape_follows() {
                    return Err(self.error(
                        ErrorKind::InvalidCharRange,
                        item_start..self.pos + 2,
                    ));
                }
                hi = self.parse_class_char(start)?;
                if hi < lo {
                    return Err(self.error(
                        ErrorKind::InvalidCharRange,
                        item_start..self.pos,
                    ));
                }
            }

            class.items.push(ClassItem::Range { start: lo, end: hi, fold });
            first = false;
        }

        self.depth -= 1;
        Ok(class)
    }

    /// Parses a single character inside a class, which can be a literal
    /// character or an escape sequence.
    fn parse_class_char(&mut self, class_start: usize) -> Result<char> {
        let start = self.pos;
        match self.bump() {
            None => Err(self.error(
                ErrorKind::MissingBracket,
                class_start..self.pattern.len(),
            )),
            Some('\\') => self.parse_escaped_char(start),
            Some(c) => Ok(c),
        }
    }

    /// Returns true if the current position is at an escape sequence that
    /// represents a class, like `\d` or `\pL`.
    fn class_escape_follows(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('\\')
            && matches!(
                chars.next(),
                Some('d' | 'D' | 's' | 'S' | 'w' | 'W' | 'p' | 'P')
            )
    }

    /// Parses a POSIX class like `[:alpha:]` or `[:^alpha:]`. Returns
    /// `None` without consuming anything if there's no `:]` closing the
    /// class, in which case the `[` is just a literal.
    fn parse_posix_class(&mut self) -> Result<Option<Class>> {
        let start = self.pos;
        // The closing `:]` is searched after the opening `[:`, so `[:]`
        // is not a class.
        let end = match self.rest()[2..].find(":]") {
            Some(i) => start + 2 + i + 2,
            None => return Ok(None),
        };
        let name = &self.pattern[start + 2..end - 2];
        self.pos = end;

        let (negated, name) = match name.strip_prefix('^') {
            Some(name) => (true, name),
            None => (false, name),
        };

        let ranges: &[(char, char)] = match name {
            "alnum" => &[('0', '9'), ('A', 'Z'), ('a', 'z')],
            "alpha" => &[('A', 'Z'), ('a', 'z')],
            "ascii" => &[('\0', '\x7F')],
            "blank" => &[('\t', '\t'), (' ', ' ')],
            "cntrl" => &[('\0', '\x1F'), ('\x7F', '\x7F')],
            "digit" => &[('0', '9')],
            "graph" => &[('!', '~')],
            "lower" => &[('a', 'z')],
            "print" => &[(' ', '~')],
            "punct" => &[('!', '/'), (':', '@'), ('[', '`'), ('{', '~')],
            "space" => &[('\t', '\r'), (' ', ' ')],
            "upper" => &[('A', 'Z')],
            "word" => &[('0', '9'), ('A', 'Z'), ('a', 'z'), ('_', '_')],
            "xdigit" => &[('0', '9'), ('A', 'F'), ('a', 'f')],
            _ => {
                return Err(
                    self.error(ErrorKind::InvalidCharRange, start..end)
                )
            }
        };

        let mut class = Class::from_ranges(
            ranges.iter().copied(),
            self.flags.contains(ParseFlags::CaseInsensitive),
        );
        class.negated = negated;
        Ok(Some(class))
    }

    /// Parses an escape sequence outside a class. The backslash was already
    /// consumed.
    fn parse_escape(&mut self, start: usize) -> Result<Ast> {
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    ErrorKind::TrailingBackslash,
                    start..self.pattern.len(),
                ))
            }
        };

        let unicode_wb = self.config.unicode_word_boundary;

        let look = match c {
            'A' => Some(Look::StartText),
            'z' => Some(Look::EndText),
            'b' if unicode_wb => Some(Look::WordUnicode),
            'b' => Some(Look::WordAscii),
            'B' if unicode_wb => Some(Look::WordUnicodeNegate),
            'B' => Some(Look::WordAsciiNegate),
            _ => None,
        };

        if let Some(look) = look {
            self.bump();
            return Ok(Ast::Look(look));
        }

        if matches!(c, 'd' | 'D' | 's' | 'S' | 'w' | 'W' | 'p' | 'P') {
            return Ok(Ast::Class(self.parse_class_escape(start)?));
        }

        let c = self.parse_escaped_char(start)?;
        Ok(self.literal(c))
    }

    /// Parses escape sequences that represent a class: Perl classes like
    /// `\d` and Unicode classes like `\pL`, `\p{Greek}` and `\P{^Greek}`.
    /// The backslash was already consumed.
    fn parse_class_escape(&mut self, start: usize) -> Result<Class> {
        let fold = self.flags.contains(ParseFlags::CaseInsensitive);
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    ErrorKind::TrailingBackslash,
                    start..self.pattern.len(),
                ))
            }
        };

        let perl: &[(char, char)] = match c {
            'd' | 'D' => &[('0', '9')],
            's' | 'S' => &[('\t', '\n'), ('\x0C', '\r'), (' ', ' ')],
            'w' | 'W' => &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
            _ => &[],
        };

        if !perl.is_empty() {
            let mut class = Class::from_ranges(perl.iter().copied(), fold);
            class.negated = c.is_ascii_uppercase();
            return Ok(class);
        }

        // What remains is `\p` or `\P`.
        if !self.config.unicode_groups {
            return Err(self.error(ErrorKind::InvalidEscape, start..self.pos));
        }

        let name = if self.eat('{') {
            let name_start = self.pos;
            match self.rest().find('}') {
                Some(i) => {
                    self.pos += i + 1;
                    &self.pattern[name_start..name_start + i]
                }
                None => {
                    return Err(self.error(
                        ErrorKind::InvalidCharRange,
                        start..self.pattern.len(),
                    ))
                }
            }
        } else {
            let name_start = self.pos;
            match self.bump() {
                Some(_) => &self.pattern[name_start..self.pos],
                None => {
                    return Err(self.error(
                        ErrorKind::InvalidCharRange,
                        start..self.pattern.len(),
                    ))
                }
            }
        };

        let (caret, name) = match name.strip_prefix('^') {
            Some(name) => (true, name),
            None => (false, name),
        };

        let set = match unicode::property_class(name) {
            Some(set) => set,
            None => {
                return Err(
                    self.error(ErrorKind::InvalidCharRange, start..self.pos)
                )
            }
        };

        let mut class = Class::from_ranges(
            set.ranges().iter().map(|r| (r.start(), r.end())),
            fold,
        );
        class.negated = (c == 'P') != caret;
        Ok(class)
    }

    /// Parses an escape sequence that represents a single character. The
    /// current position is right after the backslash.
    fn parse_escaped_char(&mut self, start: usize) -> Result<char> {
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    ErrorKind::TrailingBackslash,
                    start..self.pattern.len(),
                ))
            }
        };

        let invalid = |p: &Self| {
            Err(p.error(ErrorKind::InvalidEscape, start..p.pos))
        };

        match c {
            'a' => Ok('\x07'),
            'f' => Ok('\x0C'),
            't' => Ok('\t'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            'v' => Ok('\x0B'),
            // `\1` to `\7` would be backreferences, they are accepted only
            // as the first digit of an octal number.
            '1'..='7' if !matches!(self.peek(), Some('0'..='7')) => {
                invalid(self)
            }
            '0'..='7' => {
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            self.bump();
                        }
                        _ => break,
                    }
                }
                // At most 0o777, always a valid char.
                char::from_u32(value).map_or_else(|| invalid(self), Ok)
            }
            'x' => self.parse_hex(start),
            c if c.is_ascii_punctuation() => Ok(c),
            _ => invalid(self),
        }
    }

    /// Parses `\xHH` or `\x{H...}`. The current position is right after the
    /// `x`.
    fn parse_hex(&mut self, start: usize) -> Result<char> {
        let digits = if self.eat('{') {
            let digits_start = self.pos;
            match self.rest().find('}') {
                Some(i) => {
                    self.pos += i + 1;
                    &self.pattern[digits_start..digits_start + i]
                }
                None => {
                    self.pos = self.pattern.len();
                    return Err(
                        self.error(ErrorKind::InvalidEscape, start..self.pos)
                    );
                }
            }
        } else {
            let digits_start = self.pos;
            for _ in 0..2 {
                if self.bump().is_none() {
                    return Err(
                        self.error(ErrorKind::InvalidEscape, start..self.pos)
                    );
                }
            }
            &self.pattern[digits_start..self.pos]
        };

        if digits.is_empty()
            || digits.len() > 8
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(self.error(ErrorKind::InvalidEscape, start..self.pos));
        }

        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                self.error(ErrorKind::InvalidEscape, start..self.pos)
            })
    }

    /// Returns a literal for character `c`, taking into account the
    /// case-insensitivity flag.
    fn literal(&self, c: char) -> Ast {
        let fold = self.flags.contains(ParseFlags::CaseInsensitive)
            && unicode::has_case_variants(c);
        Ast::Literal(Literal { chars: vec![c], fold })
    }

    fn enter_nesting(&mut self, start: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.nest_limit {
            return Err(self.error(ErrorKind::NestingDepth, start..start + 1));
        }
        Ok(())
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.pattern[self.pos..]
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    #[inline]
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, kind: ErrorKind, span: Range<usize>) -> SyntaxError {
        SyntaxError::new(kind, self.pattern, span)
    }
}

/// Upper bound in a counted repetition.
enum RepeatMax {
    /// `{n}`
    Exactly,
    /// `{n,}`
    Unbounded,
    /// `{n,m}`, `None` if `m` overflows.
    Bounded(Option<u32>),
}

/// Scans a counted repetition at the start of `s`. Returns the length of
/// the repetition operator, the minimum (`None` if it overflows) and the
/// maximum. Returns `None` if `s` doesn't start with something that has the
/// syntax of a counted repetition.
fn scan_repeat_count(s: &str) -> Option<(usize, Option<u32>, RepeatMax)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let scan_number = |from: usize| -> (usize, Option<u32>) {
        let len =
            bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
        let value = s[from..from + len].parse::<u32>().ok();
        (from + len, value)
    };

    let (pos, min) = scan_number(1);
    if pos == 1 {
        return None;
    }

    match bytes.get(pos) {
        Some(b'}') => Some((pos + 1, min, RepeatMax::Exactly)),
        Some(b',') => {
            let (end, max) = scan_number(pos + 1);
            if bytes.get(end) != Some(&b'}') {
                return None;
            }
            if end == pos + 1 {
                Some((end + 1, min, RepeatMax::Unbounded))
            } else {
                Some((end + 1, min, RepeatMax::Bounded(max)))
            }
        }
        _ => None,
    }
}

/// Pushes `ast` at the end of `items`, merging it with the previous item if
/// both are literals with the same case sensitivity.
fn push_folding(items: &mut Vec<Ast>, ast: Ast) {
    if let Ast::Literal(lit) = &ast {
        if let Some(Ast::Literal(prev)) = items.last_mut() {
            if prev.fold == lit.fold {
                prev.chars.extend_from_slice(&lit.chars);
                return;
            }
        }
    }
    items.push(ast)
}

#[cfg(test)]
mod tests;
