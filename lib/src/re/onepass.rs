/*! A deterministic engine for one-pass programs.

A program is one-pass when, at every point of an anchored search, the next
input byte is enough to decide which path to follow. Such programs can be
executed without keeping multiple threads alive and without backtracking,
which makes them the fastest option for extracting capture groups.

The analysis works on *states*. A state is either the start of the program
or the destination of some byte transition. For each state the analysis
follows every path of non-consuming instructions, in priority order, until
it finds an instruction that consumes a byte or a [`Instr::Match`]. Each of
these paths is an [`Exit`], which also records the capture slots and the
assertions found along the way. The program is one-pass if, for every
state:

* no instruction is reached twice while following the paths,
* there's at most one path that ends in [`Instr::Match`], and
* the bytes accepted by the paths that consume input don't overlap.

When these conditions hold, at most one exit can consume the next byte, so
a single thread is enough.
*/

use bitvec::vec::BitVec;
use rustc_hash::FxHashMap;

use crate::re::engine::Input;
use crate::re::literal::ByteSet;
use crate::re::thompson::instr::{Instr, InstrId, Program, Transition};
use crate::re::{is_char_boundary, Captures, Look};

/// Programs larger than this are not analyzed.
pub const MAX_ONEPASS_PROG: usize = 1000;

/// Where an [`Exit`] leads to.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ExitKind {
    /// Consumes a byte. The `next` field in each transition is the index
    /// of the destination state.
    Consume(Box<[Transition]>),
    /// The program matches.
    Match,
}

/// A path from a state to a consuming instruction or to a match.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Exit {
    kind: ExitKind,
    /// Slots that receive the current position when the exit is taken.
    slots: Vec<usize>,
    /// Assertions that must hold for the exit to be taken.
    looks: Vec<Look>,
}

impl Exit {
    #[inline]
    fn looks_match(&self, haystack: &[u8], pos: usize) -> bool {
        self.looks.iter().all(|look| look.is_match(haystack, pos))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct State {
    /// Exits in priority order.
    exits: Vec<Exit>,
}

/// The one-pass table of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnePass {
    states: Vec<State>,
}

impl OnePass {
    /// Analyzes a program and returns its one-pass table, or `None` if the
    /// program is not one-pass.
    pub fn new(instrs: &[Instr], slots: usize) -> Option<Self> {
        if instrs.len() > MAX_ONEPASS_PROG {
            return None;
        }

        let mut state_ids: FxHashMap<InstrId, usize> = FxHashMap::default();
        let mut pending = vec![Program::START];
        let mut states = Vec::new();

        state_ids.insert(Program::START, 0);

        while let Some(ip) = pending.pop() {
            let state = state_ids[&ip];
            let exits = closure(instrs, ip, slots)?;

            for exit in &exits {
                if let ExitKind::Consume(transitions) = &exit.kind {
                    for t in transitions.iter() {
                        if !state_ids.contains_key(&t.next) {
                            state_ids.insert(t.next, state_ids.len());
                            pending.push(t.next);
                        }
                    }
                }
            }

            if states.len() <= state {
                states.resize(state + 1, State { exits: Vec::new() });
            }
            states[state] = State { exits };
        }

        // Transitions point to instructions, make them point to states.
        for state in states.iter_mut() {
            for exit in state.exits.iter_mut() {
                if let ExitKind::Consume(transitions) = &mut exit.kind {
                    for t in transitions.iter_mut() {
                        t.next = state_ids[&t.next];
                    }
                }
            }
        }

        Some(Self { states })
    }

    /// Number of states in the table.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Executes the program at the start of the input. The search is always
    /// anchored at the start.
    pub(crate) fn search(
        &self,
        program: &Program,
        input: &Input,
    ) -> Option<Captures> {
        let haystack = input.haystack();
        let mut pos = input.start();

        if pos > haystack.len() || !is_char_boundary(haystack, pos) {
            return None;
        }

        let stride =
            if input.want_captures() { program.slot_count() } else { 2 };

        let longest = program.is_longest_match();

        let mut slots = vec![None; stride];
        let mut matched: Option<Vec<Option<usize>>> = None;
        let mut state = 0;

        loop {
            let mut next: Option<(usize, &Exit)> = None;

            for exit in &self.states[state].exits {
                if !exit.looks_match(haystack, pos) {
                    continue;
                }
                match &exit.kind {
                    ExitKind::Match => {
                        if input.is_anchored_end() && pos != haystack.len() {
                            continue;
                        }
                        let mut m = slots.clone();
                        set_slots(&mut m, &exit.slots, pos);
                        matched = Some(m);
                        // Exits with lower priority are cut. If a consuming
                        // exit with higher priority was already taken, the
                        // search continues there.
                        if !longest {
                            break;
                        }
                    }
                    ExitKind::Consume(transitions) => {
                        if next.is_some() {
                            continue;
                        }
                        let target = haystack.get(pos).and_then(|b| {
                            transitions.iter().find(|t| t.matches(*b))
                        });
                        if let Some(t) = target {
                            next = Some((t.next, exit));
                        }
                    }
                }
            }

            match next {
                Some((target, exit)) => {
                    set_slots(&mut slots, &exit.slots, pos);
                    state = target;
                    pos += 1;
                }
                None => break,
            }
        }

        matched.map(|slots| {
            let mut result = vec![None; program.slot_count()];
            result[..slots.len()].copy_from_slice(&slots);
            Captures::new(result.into_boxed_slice())
        })
    }
}

fn set_slots(slots: &mut [Option<usize>], written: &[usize], pos: usize) {
    for slot in written {
        if let Some(s) = slots.get_mut(*slot) {
            *s = Some(pos);
        }
    }
}

/// Follows every non-consuming path starting at `start`, in priority order,
/// and returns the exits. Returns `None` if the paths violate any of the
/// one-pass conditions.
fn closure(
    instrs: &[Instr],
    start: InstrId,
    slots: usize,
) -> Option<Vec<Exit>> {
    let mut visited: BitVec = BitVec::repeat(false, instrs.len());
    let mut stack = vec![(start, Vec::new(), Vec::new())];
    let mut exits = Vec::new();
    let mut accepted = ByteSet::new();
    let mut has_match = false;

    while let Some((ip, mut path_slots, mut looks)) = stack.pop() {
        if visited[ip] {
            return None;
        }
        visited.set(ip, true);

        match &instrs[ip] {
            instr @ (Instr::ByteRange(_) | Instr::Sparse(_)) => {
                let mut bytes = ByteSet::new();
                for t in instr.transitions() {
                    bytes.add_range(t.start, t.end);
                }
                if accepted.intersects(&bytes) {
                    return None;
                }
                accepted.union(&bytes);
                exits.push(Exit {
                    kind: ExitKind::Consume(instr.transitions().into()),
                    slots: path_slots,
                    looks,
                });
            }
            Instr::Match => {
                if has_match {
                    return None;
                }
                has_match = true;
                exits.push(Exit {
                    kind: ExitKind::Match,
                    slots: path_slots,
                    looks,
                });
            }
            Instr::Split(a, b) => {
                stack.push((*b, path_slots.clone(), looks.clone()));
                stack.push((*a, path_slots, looks));
            }
            Instr::Capture { slot, next } => {
                if *slot < slots {
                    path_slots.push(*slot);
                }
                stack.push((*next, path_slots, looks));
            }
            Instr::Look { look, next } => {
                looks.push(*look);
                stack.push((*next, path_slots, looks));
            }
            Instr::Nop(next) => stack.push((*next, path_slots, looks)),
            Instr::Fail => {}
        }
    }

    Some(exits)
}
