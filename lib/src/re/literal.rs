/*! Literal summaries of compiled programs and the literal fast path.

The compiler extracts two pieces of information from every program that
allow skipping large portions of the input without running any automaton:

* A [`Prefix`]: the bytes that every match must start with. When the prefix
  is the whole regexp (e.g: `foobar`) the program is a pure literal and
  searching for it doesn't need an automaton at all.
* A [`ByteSet`] with the bytes that can appear at the start of a match. It's
  not available for regexps that can match the empty string.
*/

use bitvec::array::BitArray;
use bitvec::order::Lsb0;
use memchr::memmem;

use crate::re::engine::Input;
use crate::re::Captures;

/// A set of bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteSet(BitArray<[u64; 4], Lsb0>);

impl ByteSet {
    pub fn new() -> Self {
        Self(BitArray::new([0; 4]))
    }

    /// Adds all the bytes in the range `start..=end`.
    pub fn add_range(&mut self, start: u8, end: u8) {
        for b in start..=end {
            self.0.set(b as usize, true);
        }
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.0[byte as usize]
    }

    /// Number of bytes in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    /// Returns true if both sets have at least one byte in common.
    pub fn intersects(&self, other: &ByteSet) -> bool {
        self.0.iter_ones().any(|b| other.0[b])
    }

    /// Adds all the bytes in `other` to this set.
    pub fn union(&mut self, other: &ByteSet) {
        for b in other.0.iter_ones() {
            self.0.set(b, true);
        }
    }

    /// Iterator over the bytes in the set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter_ones().map(|b| b as u8)
    }

    /// Returns the position of the first byte in `haystack[from..]` that
    /// belongs to the set.
    pub fn find(&self, haystack: &[u8], from: usize) -> Option<usize> {
        let hay = haystack.get(from..)?;
        let mut bytes = self.iter();
        let found = match self.len() {
            0 => None,
            1 => memchr::memchr(bytes.next()?, hay),
            2 => memchr::memchr2(bytes.next()?, bytes.next()?, hay),
            3 => memchr::memchr3(
                bytes.next()?,
                bytes.next()?,
                bytes.next()?,
                hay,
            ),
            _ => hay.iter().position(|b| self.contains(*b)),
        };
        found.map(|pos| from + pos)
    }
}

/// Bytes that every match of a regexp starts with.
#[derive(Clone, Debug)]
pub struct Prefix {
    finder: memmem::Finder<'static>,
    /// True if the prefix is the whole regexp.
    complete: bool,
}

impl PartialEq for Prefix {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes() && self.complete == other.complete
    }
}

impl Eq for Prefix {}

impl Prefix {
    pub fn new(bytes: &[u8], complete: bool) -> Self {
        Self { finder: memmem::Finder::new(bytes).into_owned(), complete }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.finder.needle()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Returns true if the regexp matches this literal and nothing else.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns the position of the first occurrence of the prefix in
    /// `haystack[from..]`.
    #[inline]
    pub fn find(&self, haystack: &[u8], from: usize) -> Option<usize> {
        self.finder.find(haystack.get(from..)?).map(|pos| from + pos)
    }

    /// Returns true if the prefix occurs in `haystack` at position `at`.
    #[inline]
    pub fn is_prefix_at(&self, haystack: &[u8], at: usize) -> bool {
        haystack
            .get(at..)
            .is_some_and(|rest| rest.starts_with(self.as_bytes()))
    }
}

/// Searches for a regexp that is a pure literal.
///
/// `prefix` must be complete, and the program it comes from must have no
/// capture groups other than group 0. `slots` is the number of slots in the
/// result.
pub(crate) fn search(
    prefix: &Prefix,
    input: &Input,
    slots: usize,
) -> Option<Captures> {
    debug_assert!(prefix.is_complete());

    let haystack = input.haystack();
    let start = input.start();
    let len = prefix.len();

    let candidate = if input.is_anchored_start() {
        Some(start).filter(|pos| prefix.is_prefix_at(haystack, *pos))
    } else if input.is_anchored_end() {
        // Only one occurrence can end at the end of the input.
        haystack
            .len()
            .checked_sub(len)
            .filter(|pos| *pos >= start && prefix.is_prefix_at(haystack, *pos))
    } else {
        prefix.find(haystack, start)
    };

    let pos = candidate?;

    if input.is_anchored_end() && pos + len != haystack.len() {
        return None;
    }

    let mut result = vec![None; slots];
    result[0] = Some(pos);
    result[1] = Some(pos + len);

    Some(Captures::new(result.into_boxed_slice()))
}
