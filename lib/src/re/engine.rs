/*! Engine selection.

Every search goes through [`search`], which chooses the cheapest engine that
can handle the program and the input, and runs it. The choice depends only
on properties of the program computed at compile time, the length of the
input, and whether the search is anchored. It never changes the result.
*/

use log::*;

use crate::re::backtrack::{self, Backtracker};
use crate::re::literal;
use crate::re::thompson::instr::{Metrics, Program};
use crate::re::thompson::pikevm::PikeVM;
use crate::re::Captures;

/// Describes a search: the haystack, where the search starts, and how the
/// match must be anchored.
#[derive(Clone, Copy, Debug)]
pub struct Input<'h> {
    haystack: &'h [u8],
    start: usize,
    anchored_start: bool,
    anchored_end: bool,
    captures: bool,
}

impl<'h> Input<'h> {
    /// Creates an unanchored search over the whole haystack, which reports
    /// every capture group.
    pub fn new<H: ?Sized + AsRef<[u8]>>(haystack: &'h H) -> Self {
        Self {
            haystack: haystack.as_ref(),
            start: 0,
            anchored_start: false,
            anchored_end: false,
            captures: true,
        }
    }

    /// Starts the search at byte offset `start`. Bytes before `start` are
    /// still visible to assertions like `\b`.
    pub fn start_at(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// If true, the match must start at the position where the search
    /// starts.
    pub fn anchored_start(mut self, yes: bool) -> Self {
        self.anchored_start = yes;
        self
    }

    /// If true, the match must end at the end of the haystack.
    pub fn anchored_end(mut self, yes: bool) -> Self {
        self.anchored_end = yes;
        self
    }

    /// If false, only the span of the whole match is reported, and every
    /// other group is unset in the result. This makes some searches
    /// cheaper.
    pub fn captures(mut self, yes: bool) -> Self {
        self.captures = yes;
        self
    }

    #[inline]
    pub fn haystack(&self) -> &'h [u8] {
        self.haystack
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn is_anchored_start(&self) -> bool {
        self.anchored_start
    }

    #[inline]
    pub fn is_anchored_end(&self) -> bool {
        self.anchored_end
    }

    #[inline]
    pub fn want_captures(&self) -> bool {
        self.captures
    }
}

/// The engines available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Literal,
    OnePass,
    Backtrack,
    PikeVM,
}

/// Scratch space used by the engines.
///
/// Creating a cache is cheap, but reusing one across searches avoids
/// allocating memory on every search. A cache can be used with any program,
/// but not by two searches at the same time.
#[derive(Default)]
pub struct Cache {
    pikevm: PikeVM,
    backtrack: Backtracker,
}

impl Cache {
    pub fn new() -> Self {
        Self { pikevm: PikeVM::new(), backtrack: Backtracker::new() }
    }

    /// Releases the memory held by the cache.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number of steps executed by the last search that used the Pike VM.
    pub fn pikevm_steps(&self) -> usize {
        self.pikevm.steps()
    }
}

/// Chooses an engine for a program with the given metrics and a search over
/// `input_len` bytes.
pub fn select(
    metrics: Metrics,
    input_len: usize,
    anchored: bool,
) -> EngineKind {
    if metrics.literal {
        EngineKind::Literal
    } else if metrics.one_pass && anchored {
        EngineKind::OnePass
    } else if backtrack::fits(metrics.size, input_len) {
        EngineKind::Backtrack
    } else {
        EngineKind::PikeVM
    }
}

/// Searches for the first match of `program` in the input, using the most
/// appropriate engine.
pub fn search(
    program: &Program,
    cache: &mut Cache,
    input: &Input,
) -> Option<Captures> {
    let haystack = input.haystack();
    let start = input.start();

    if start > haystack.len() {
        return None;
    }

    // A program that starts with `\A` can only match at offset 0.
    if program.is_anchored_start() && start > 0 {
        return None;
    }

    let anchored = input.is_anchored_start() || program.is_anchored_start();

    // If there's no byte in the input that can start a match there's no
    // need to run any engine.
    if let Some(first_bytes) = program.first_bytes() {
        let found = if anchored {
            haystack.get(start).is_some_and(|b| first_bytes.contains(*b))
        } else {
            first_bytes.find(haystack, start).is_some()
        };
        if !found {
            return None;
        }
    }

    let kind = select(program.metrics(), haystack.len() - start, anchored);

    trace!("searching with {:?} at offset {}", kind, start);

    search_with(kind, program, cache, input)
}

/// Searches for the first match of `program` in the input with a specific
/// engine.
///
/// If the engine can't handle the program or the input, the search falls
/// back to the Pike VM, which can handle anything.
pub fn search_with(
    kind: EngineKind,
    program: &Program,
    cache: &mut Cache,
    input: &Input,
) -> Option<Captures> {
    let anchored = input.is_anchored_start() || program.is_anchored_start();

    match kind {
        EngineKind::Literal => match program.as_literal() {
            Some(prefix) => {
                literal::search(prefix, input, program.slot_count())
            }
            None => cache.pikevm.search(program, input),
        },
        EngineKind::OnePass => match &program.onepass {
            Some(onepass) if anchored => onepass.search(program, input),
            _ => cache.pikevm.search(program, input),
        },
        EngineKind::Backtrack => {
            match cache.backtrack.search(program, input) {
                Ok(result) => result,
                Err(err) => {
                    debug!("{}, falling back to the Pike VM", err);
                    cache.pikevm.search(program, input)
                }
            }
        }
        EngineKind::PikeVM => cache.pikevm.search(program, input),
    }
}
