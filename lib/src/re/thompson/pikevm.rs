use std::mem;

use crate::re::bitmapset::ThreadSet;
use crate::re::engine::Input;
use crate::re::thompson::instr::{Instr, InstrId, Program};
use crate::re::{is_char_boundary, Captures};

/// Represents a [Pike's VM](https://swtch.com/~rsc/regexp/regexp2.html) that
/// executes programs produced by the
/// [compiler][`crate::re::thompson::Compiler`].
///
/// The VM simulates every possible path through the program in lockstep,
/// one input byte at a time. Each path is a thread, and there's at most one
/// thread per instruction, so the cost of processing a byte is bounded by
/// the size of the program. Threads are kept in priority order, which is
/// what allows the VM to report the same match a backtracker would.
///
/// A `PikeVM` holds only scratch space, it can be reused for any number of
/// searches with any number of programs.
#[derive(Default)]
pub(crate) struct PikeVM {
    /// The set of currently active threads. Each item in this set is an
    /// instruction in the program, the VM guarantees that there aren't two
    /// active threads at the same instruction.
    threads: ThreadSet,
    /// The set of threads that will become the active threads when the next
    /// byte is read from the input.
    next_threads: ThreadSet,
    /// State for the [`epsilon_closure`] function.
    cache: EpsilonClosureState,
}

impl PikeVM {
    /// Creates a new [`PikeVM`]. The thread sets are sized when a search
    /// starts.
    pub fn new() -> Self {
        Self {
            threads: ThreadSet::default(),
            next_threads: ThreadSet::default(),
            cache: EpsilonClosureState::new(2),
        }
    }

    /// Number of steps executed by the last search. Each step is the
    /// processing of one thread at one position.
    pub fn steps(&self) -> usize {
        self.cache.steps
    }

    /// Searches for the first match of `program` in the input.
    pub fn search(
        &mut self,
        program: &Program,
        input: &Input,
    ) -> Option<Captures> {
        let haystack = input.haystack();
        let start = input.start();

        if start > haystack.len() {
            return None;
        }

        // When captures are not needed, only the span of the whole match is
        // tracked.
        let stride =
            if input.want_captures() { program.slot_count() } else { 2 };

        let anchored =
            input.is_anchored_start() || program.is_anchored_start();
        let longest = program.is_longest_match();

        self.threads.resize(program.len(), stride);
        self.next_threads.resize(program.len(), stride);
        self.cache.reset(stride);

        let mut matched: Option<Vec<Option<usize>>> = None;
        let mut pos = start;

        loop {
            if self.threads.is_empty() {
                // No more threads and a match was already found, or the
                // search is anchored and the only starting position has
                // been tried already.
                if matched.is_some() || (anchored && pos > start) {
                    break;
                }
                // Skip the positions where a match can't start.
                if !anchored {
                    let next = match (program.prefix(), program.first_bytes())
                    {
                        (Some(prefix), _) => prefix.find(haystack, pos),
                        (None, Some(first)) => first.find(haystack, pos),
                        (None, None) => Some(pos),
                    };
                    match next {
                        Some(next) => pos = next,
                        None => break,
                    }
                }
            }

            // A new thread starting at the current position has the lowest
            // priority, as every existing thread started before.
            if matched.is_none()
                && (!anchored || pos == start)
                && is_char_boundary(haystack, pos)
            {
                self.cache.slots.fill(None);
                epsilon_closure(
                    program,
                    haystack,
                    Program::START,
                    pos,
                    &mut self.cache,
                    &mut self.threads,
                );
            }

            let curr_byte = haystack.get(pos).copied();

            for i in 0..self.threads.len() {
                let ip = self.threads.get(i);
                self.cache.steps += 1;

                match program.instr(ip) {
                    Instr::Match => {
                        if input.is_anchored_end() && pos != haystack.len() {
                            continue;
                        }
                        let slots = self.threads.slots(ip);
                        if !longest {
                            // Threads after this one have lower priority,
                            // they are cut.
                            matched = Some(slots.to_vec());
                            break;
                        }
                        let better = match &matched {
                            None => true,
                            Some(m) => {
                                slots[0] < m[0]
                                    || (slots[0] == m[0] && slots[1] > m[1])
                            }
                        };
                        if better {
                            matched = Some(slots.to_vec());
                        }
                    }
                    instr => {
                        let next =
                            match curr_byte.and_then(|b| instr.next_for(b)) {
                                Some(next) => next,
                                None => continue,
                            };
                        // In longest mode threads that started after the
                        // current match can't produce a better one.
                        if let Some(m) = &matched {
                            if longest && m[0] < self.threads.slots(ip)[0] {
                                continue;
                            }
                        }
                        self.cache
                            .slots
                            .copy_from_slice(self.threads.slots(ip));
                        epsilon_closure(
                            program,
                            haystack,
                            next,
                            pos + 1,
                            &mut self.cache,
                            &mut self.next_threads,
                        );
                    }
                }
            }

            if pos >= haystack.len() {
                break;
            }

            mem::swap(&mut self.threads, &mut self.next_threads);
            self.next_threads.clear();
            pos += 1;
        }

        self.threads.clear();
        self.next_threads.clear();

        matched.map(|slots| {
            let mut result = vec![None; program.slot_count()];
            result[..slots.len()].copy_from_slice(&slots);
            Captures::new(result.into_boxed_slice())
        })
    }
}

/// Frames in the stack used by [`epsilon_closure`].
#[derive(Debug)]
enum Frame {
    /// Follow the instruction.
    Explore(InstrId),
    /// Put back the value that a capture slot had before following a
    /// [`Instr::Capture`].
    RestoreCapture { slot: usize, old: Option<usize> },
}

/// Structure used by the [`epsilon_closure`] function for maintaining
/// its state during the computation of an epsilon closure. See the
/// documentation of [`epsilon_closure`] for details.
#[derive(Default)]
pub(crate) struct EpsilonClosureState {
    stack: Vec<Frame>,
    /// Capture slots of the thread being followed. Must be initialized with
    /// the slots of the parent thread before calling [`epsilon_closure`].
    pub slots: Vec<Option<usize>>,
    pub steps: usize,
}

impl EpsilonClosureState {
    pub fn new(stride: usize) -> Self {
        let mut state = Self::default();
        state.reset(stride);
        state
    }

    fn reset(&mut self, stride: usize) {
        self.stack.clear();
        self.slots.clear();
        self.slots.resize(stride, None);
        self.steps = 0;
    }
}

/// Computes the epsilon closure of `start` at position `pos`, adding the
/// resulting threads to `closure`.
///
/// The epsilon closure is the set of instructions that can be reached from
/// `start` without consuming any input. Only consuming instructions and
/// [`Instr::Match`] become threads, but every instruction visited is added
/// to the set so that it's not followed again at the same position. This
/// also guarantees that loops made of instructions that don't consume input
/// (like the ones in `(a*)*`) are followed only once.
///
/// Instructions are followed in priority order, and each thread gets a copy
/// of the capture slots as they were when the thread was reached.
pub(crate) fn epsilon_closure(
    program: &Program,
    haystack: &[u8],
    start: InstrId,
    pos: usize,
    state: &mut EpsilonClosureState,
    closure: &mut ThreadSet,
) {
    state.stack.push(Frame::Explore(start));

    while let Some(frame) = state.stack.pop() {
        let ip = match frame {
            Frame::Explore(ip) => ip,
            Frame::RestoreCapture { slot, old } => {
                state.slots[slot] = old;
                continue;
            }
        };

        if !closure.insert(ip) {
            continue;
        }

        state.steps += 1;

        match program.instr(ip) {
            Instr::ByteRange(_) | Instr::Sparse(_) | Instr::Match => {
                closure.slots_mut(ip).copy_from_slice(&state.slots);
            }
            Instr::Split(a, b) => {
                state.stack.push(Frame::Explore(*b));
                state.stack.push(Frame::Explore(*a));
            }
            Instr::Capture { slot, next } => {
                if *slot < state.slots.len() {
                    state.stack.push(Frame::RestoreCapture {
                        slot: *slot,
                        old: state.slots[*slot],
                    });
                    state.slots[*slot] = Some(pos);
                }
                state.stack.push(Frame::Explore(*next));
            }
            Instr::Look { look, next } => {
                if look.is_match(haystack, pos) {
                    state.stack.push(Frame::Explore(*next));
                }
            }
            Instr::Nop(next) => state.stack.push(Frame::Explore(*next)),
            Instr::Fail => {}
        }
    }
}
