/*! A bounded backtracking engine.

The backtracker explores the paths through the program depth-first, in
priority order, so the first match it finds is the one with the highest
priority. Plain backtracking can take exponential time, but this one
records every (instruction, position) pair it has visited and never
explores the same pair twice, which bounds the work to
`O(program size × input length)`.

The price is a bitmap with one bit per pair, so the backtracker is used
only when both the program and the input are small. When they aren't,
[`Backtracker::search`] refuses to run and the caller must use another
engine.
*/

use bitvec::vec::BitVec;
use thiserror::Error;

use crate::re::engine::Input;
use crate::re::thompson::instr::{Instr, InstrId, Program};
use crate::re::{is_char_boundary, Captures};

/// Maximum number of bits in the visited bitmap.
pub const MAX_BACKTRACK_BITS: usize = 256 * 1024;

/// Maximum number of instructions in a program run by the backtracker.
pub const MAX_BACKTRACK_PROG: usize = 500;

/// Error returned when the program or the input are too large for the
/// backtracker.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("backtracker budget exceeded: {instrs} instructions, {len} bytes")]
pub struct TooBig {
    pub instrs: usize,
    pub len: usize,
}

/// Returns true if a program with `instrs` instructions can be run by the
/// backtracker on an input of `len` bytes.
#[inline]
pub fn fits(instrs: usize, len: usize) -> bool {
    instrs <= MAX_BACKTRACK_PROG
        && instrs.saturating_mul(len.saturating_add(1)) <= MAX_BACKTRACK_BITS
}

#[derive(Debug)]
enum Job {
    /// Execute instruction `ip` at position `pos`.
    Step { ip: InstrId, pos: usize },
    /// Put back the value that a capture slot had before the last
    /// [`Instr::Capture`] that modified it.
    RestoreCapture { slot: usize, old: Option<usize> },
}

/// Scratch space for the backtracker, reusable across searches.
#[derive(Debug, Default)]
pub(crate) struct Backtracker {
    jobs: Vec<Job>,
    /// One bit per (instruction, position) pair.
    visited: BitVec,
    slots: Vec<Option<usize>>,
}

impl Backtracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches for the first match of `program` in the input.
    ///
    /// Returns [`TooBig`] if the visited bitmap required for this program
    /// and input exceeds the budget.
    pub fn search(
        &mut self,
        program: &Program,
        input: &Input,
    ) -> Result<Option<Captures>, TooBig> {
        let haystack = input.haystack();
        let start = input.start();

        if start > haystack.len() {
            return Ok(None);
        }

        let len = haystack.len() - start;

        if !fits(program.len(), len) {
            return Err(TooBig { instrs: program.len(), len });
        }

        let stride =
            if input.want_captures() { program.slot_count() } else { 2 };

        let anchored =
            input.is_anchored_start() || program.is_anchored_start();

        // The bitmap is not cleared between start positions. A pair that
        // didn't lead to a match from one start position won't lead to a
        // match from any other.
        self.visited.clear();
        self.visited.resize(program.len() * (len + 1), false);
        self.slots.clear();
        self.slots.resize(stride, None);

        for pos in start..=haystack.len() {
            if anchored && pos > start {
                break;
            }
            if !is_char_boundary(haystack, pos) {
                continue;
            }
            if let Some(first_bytes) = program.first_bytes() {
                if !haystack.get(pos).is_some_and(|b| first_bytes.contains(*b))
                {
                    continue;
                }
            }
            self.slots.fill(None);
            if let Some(slots) = self.run(program, input, pos) {
                let mut result = vec![None; program.slot_count()];
                result[..slots.len()].copy_from_slice(&slots);
                return Ok(Some(Captures::new(result.into_boxed_slice())));
            }
        }

        Ok(None)
    }

    /// Tries to find a match that starts at `at`.
    fn run(
        &mut self,
        program: &Program,
        input: &Input,
        at: usize,
    ) -> Option<Vec<Option<usize>>> {
        let haystack = input.haystack();
        let span = haystack.len() - input.start() + 1;
        let longest = program.is_longest_match();

        let mut best: Option<Vec<Option<usize>>> = None;

        self.jobs.push(Job::Step { ip: Program::START, pos: at });

        while let Some(job) = self.jobs.pop() {
            let (mut ip, mut pos) = match job {
                Job::Step { ip, pos } => (ip, pos),
                Job::RestoreCapture { slot, old } => {
                    self.slots[slot] = old;
                    continue;
                }
            };

            loop {
                let key = ip * span + (pos - input.start());
                if self.visited[key] {
                    break;
                }
                self.visited.set(key, true);

                match program.instr(ip) {
                    instr @ (Instr::ByteRange(_) | Instr::Sparse(_)) => {
                        let next =
                            haystack.get(pos).and_then(|b| instr.next_for(*b));
                        match next {
                            Some(next) => {
                                ip = next;
                                pos += 1;
                            }
                            None => break,
                        }
                    }
                    Instr::Split(a, b) => {
                        self.jobs.push(Job::Step { ip: *b, pos });
                        ip = *a;
                    }
                    Instr::Capture { slot, next } => {
                        if *slot < self.slots.len() {
                            self.jobs.push(Job::RestoreCapture {
                                slot: *slot,
                                old: self.slots[*slot],
                            });
                            self.slots[*slot] = Some(pos);
                        }
                        ip = *next;
                    }
                    Instr::Look { look, next } => {
                        if !look.is_match(haystack, pos) {
                            break;
                        }
                        ip = *next;
                    }
                    Instr::Nop(next) => ip = *next,
                    Instr::Fail => break,
                    Instr::Match => {
                        if input.is_anchored_end() && pos != haystack.len() {
                            break;
                        }
                        if !longest {
                            self.jobs.clear();
                            return Some(self.slots.clone());
                        }
                        if best.as_ref().map_or(true, |b| self.slots[1] > b[1])
                        {
                            best = Some(self.slots.clone());
                        }
                        break;
                    }
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::{fits, MAX_BACKTRACK_BITS, MAX_BACKTRACK_PROG};

    #[test]
    fn budget() {
        assert!(fits(10, 0));
        assert!(fits(
            MAX_BACKTRACK_PROG,
            MAX_BACKTRACK_BITS / MAX_BACKTRACK_PROG - 1
        ));
        assert!(!fits(MAX_BACKTRACK_PROG + 1, 0));
        assert!(!fits(100, MAX_BACKTRACK_BITS));
        assert!(!fits(1, usize::MAX));
    }
}
