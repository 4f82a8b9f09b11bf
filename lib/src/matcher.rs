use std::ops::Range;

use crate::re::engine::{Cache, Input};
use crate::re::Captures;
use crate::regex::Regex;

/// Finds the matches of a [`Regex`] in some input, one after the other.
///
/// A matcher keeps a cursor into the input and the result of the last
/// search, which can be queried with [`Matcher::start`], [`Matcher::end`]
/// and [`Matcher::group`]. It also keeps the scratch space used by the
/// engines, so searching many times with the same matcher doesn't allocate
/// memory on every search.
///
/// ```
/// # use linre::Regex;
/// let re = Regex::new(r"(\w+)@(\w+)").unwrap();
/// let mut matcher = re.matcher("alice@home bob@work");
///
/// assert_eq!(matcher.find(), Some(0..10));
/// assert_eq!(matcher.group(2), Some("home"));
/// assert_eq!(matcher.find(), Some(11..19));
/// assert_eq!(matcher.group(1), Some("bob"));
/// assert_eq!(matcher.find(), None);
/// ```
pub struct Matcher<'h> {
    regex: Regex,
    input: &'h str,
    cache: Cache,
    /// Where the next call to [`Matcher::find`] starts. `None` when there
    /// are no more matches.
    cursor: Option<usize>,
    /// Result of the last search.
    captures: Option<Captures>,
}

impl<'h> Matcher<'h> {
    pub(crate) fn new(regex: Regex, input: &'h str) -> Self {
        Self {
            regex,
            input,
            cache: Cache::new(),
            cursor: Some(0),
            captures: None,
        }
    }

    /// The regexp used by this matcher.
    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The input where the matcher searches.
    #[inline]
    pub fn input(&self) -> &'h str {
        self.input
    }

    /// Finds the next match, starting where the previous match ended.
    ///
    /// After an empty match the search starts at the next character, so
    /// calling this repeatedly always makes progress and eventually returns
    /// `None`.
    pub fn find(&mut self) -> Option<Range<usize>> {
        let start = self.cursor?;
        let found = self.search(Input::new(self.input).start_at(start));

        self.cursor = match &found {
            Some(span) if span.is_empty() => {
                next_char_boundary(self.input, span.end)
            }
            Some(span) => Some(span.end),
            None => None,
        };

        found
    }

    /// Resets the matcher and finds the first match that starts at offset
    /// `start` or later.
    pub fn find_from(&mut self, start: usize) -> Option<Range<usize>> {
        self.reset();
        if start > self.input.len() {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(start);
        self.find()
    }

    /// Returns true if the regexp matches the whole input.
    pub fn matches(&mut self) -> bool {
        self.search(
            Input::new(self.input).anchored_start(true).anchored_end(true),
        )
        .is_some()
    }

    /// Returns true if the regexp matches at the beginning of the input.
    pub fn looking_at(&mut self) -> bool {
        self.search(Input::new(self.input).anchored_start(true)).is_some()
    }

    /// Start offset of the last match.
    pub fn start(&self) -> Option<usize> {
        self.captures.as_ref().map(|c| c.start())
    }

    /// End offset of the last match.
    pub fn end(&self) -> Option<usize> {
        self.captures.as_ref().map(|c| c.end())
    }

    /// Returns the text matched by group `i` in the last match, where group
    /// 0 is the whole match. Returns `None` if there's no match, if the
    /// group doesn't exist, or if it didn't take part in the match.
    pub fn group(&self, i: usize) -> Option<&'h str> {
        let span = self.captures.as_ref()?.get(i)?;
        self.input.get(span)
    }

    /// Like [`Matcher::group`], but the group is identified by its name.
    pub fn group_by_name(&self, name: &str) -> Option<&'h str> {
        self.group(self.regex.program().group_index(name)?)
    }

    /// Span of group `i` in the last match.
    pub fn group_span(&self, i: usize) -> Option<Range<usize>> {
        self.captures.as_ref()?.get(i)
    }

    /// Number of capture groups in the regexp, not counting group 0.
    pub fn group_count(&self) -> usize {
        self.regex.group_count()
    }

    /// Forgets the last match and moves the cursor back to the beginning of
    /// the input. The scratch space held by the matcher is released.
    pub fn reset(&mut self) {
        self.cursor = Some(0);
        self.captures = None;
        self.cache.reset();
    }

    /// Resets the matcher and replaces its input.
    pub fn reset_with(&mut self, input: &'h str) {
        self.reset();
        self.input = input;
    }

    fn search(&mut self, input: Input) -> Option<Range<usize>> {
        self.captures = self.regex.search_with_cache(&mut self.cache, &input);
        self.captures.as_ref().map(|c| c.span())
    }
}

/// Returns the offset of the character that follows the one at `pos`, or
/// `None` if `pos` is at the end of `s`.
fn next_char_boundary(s: &str, pos: usize) -> Option<usize> {
    let c = s.get(pos..)?.chars().next()?;
    Some(pos + c.len_utf8())
}
