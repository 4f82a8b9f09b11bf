/*! Instructions and programs for the regexp engines.

A [`Program`] is a sequence of [`Instr`]s addressed by index. Instructions
either consume one byte from the input ([`Instr::ByteRange`] and
[`Instr::Sparse`]) or don't consume anything (every other instruction).
The latter are the epsilon transitions of the underlying NFA.
*/

use std::fmt::{Display, Formatter};

use bitmask::bitmask;
use rustc_hash::FxHashMap;

use crate::re::literal::{ByteSet, Prefix};
use crate::re::onepass::OnePass;
use crate::re::Look;

/// Index of an instruction within a [`Program`].
pub type InstrId = usize;

/// Placeholder for the targets of instructions that are emitted before
/// knowing where they jump to. The compiler patches every one of them before
/// returning the program.
pub(crate) const PENDING: InstrId = InstrId::MAX;

/// A transition over the range of bytes `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub start: u8,
    pub end: u8,
    pub next: InstrId,
}

impl Transition {
    #[inline]
    pub fn matches(&self, byte: u8) -> bool {
        self.start <= byte && byte <= self.end
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{:#04x} -> {:05}", self.start, self.next)
        } else {
            write!(
                f,
                "{:#04x}-{:#04x} -> {:05}",
                self.start, self.end, self.next
            )
        }
    }
}

/// Instructions supported by the engines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    /// Consumes a byte in the given range and continues at `next`.
    ByteRange(Transition),
    /// Consumes a byte and continues at the transition that contains it.
    /// Transitions are sorted and don't overlap.
    Sparse(Box<[Transition]>),
    /// Continues at both instructions, the first one has higher priority.
    Split(InstrId, InstrId),
    /// Records the current position in a capture slot.
    Capture { slot: usize, next: InstrId },
    /// Continues at `next` only if the assertion holds at the current
    /// position.
    Look { look: Look, next: InstrId },
    /// Continues at the next instruction without doing anything.
    Nop(InstrId),
    /// Never matches.
    Fail,
    /// A match has been found.
    Match,
}

impl Instr {
    /// If this instruction consumes `byte`, returns the instruction where
    /// execution continues.
    #[inline]
    pub fn next_for(&self, byte: u8) -> Option<InstrId> {
        match self {
            Instr::ByteRange(t) if t.matches(byte) => Some(t.next),
            Instr::Sparse(transitions) => {
                for t in transitions.iter() {
                    if byte < t.start {
                        break;
                    }
                    if byte <= t.end {
                        return Some(t.next);
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Returns true if the instruction consumes a byte from the input.
    #[inline]
    pub fn is_consuming(&self) -> bool {
        matches!(self, Instr::ByteRange(_) | Instr::Sparse(_))
    }

    /// Returns the transitions of a consuming instruction.
    pub fn transitions(&self) -> &[Transition] {
        match self {
            Instr::ByteRange(t) => std::slice::from_ref(t),
            Instr::Sparse(transitions) => transitions,
            _ => &[],
        }
    }
}

impl Display for Instr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Instr::ByteRange(t) if t.start == t.end => write!(f, "BYTE {}", t),
            Instr::ByteRange(t) => write!(f, "RANGE {}", t),
            Instr::Sparse(transitions) => {
                write!(f, "SPARSE ")?;
                for (i, t) in transitions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                Ok(())
            }
            Instr::Split(a, b) => write!(f, "SPLIT {:05}, {:05}", a, b),
            Instr::Capture { slot, next } => {
                write!(f, "SAVE {} -> {:05}", slot, next)
            }
            Instr::Look { look, next } => {
                write!(f, "LOOK {} -> {:05}", look.as_str(), next)
            }
            Instr::Nop(next) => write!(f, "NOP -> {:05}", next),
            Instr::Fail => write!(f, "FAIL"),
            Instr::Match => write!(f, "MATCH"),
        }
    }
}

bitmask! {
    /// Flags that describe how a program was compiled.
    #[derive(Debug, Hash)]
    pub mask ProgramFlagSet: u8 where
    /// Each of the flags in a [`ProgramFlagSet`].
    flags ProgramFlags {
        CaseInsensitive = 0x01,
        DotMatchesNewLine = 0x02,
        MultiLine = 0x04,
        /// Engines look for the longest match, instead of the first one
        /// according to the priorities of alternatives and repetitions.
        LongestMatch = 0x08,
    }
}

/// The properties of a program that the engine selector takes into account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metrics {
    /// Number of instructions.
    pub size: usize,
    /// True if the program can be executed by the one-pass engine.
    pub one_pass: bool,
    /// True if the program matches a single non-empty literal.
    pub literal: bool,
}

/// A compiled regular expression.
///
/// Programs are immutable, the engines only need a shared reference to
/// them, so a single program can be used by many searches at the same time.
#[derive(Clone, Debug)]
pub struct Program {
    pub(crate) instrs: Vec<Instr>,
    /// Number of capture slots, which is two times the number of groups,
    /// including group 0.
    pub(crate) slots: usize,
    pub(crate) flags: ProgramFlagSet,
    /// Maps group names to group indexes.
    pub(crate) names: FxHashMap<String, usize>,
    /// True if every match must start at the beginning of the input.
    pub(crate) anchored_start: bool,
    pub(crate) prefix: Option<Prefix>,
    pub(crate) first_bytes: Option<ByteSet>,
    pub(crate) onepass: Option<OnePass>,
}

impl Program {
    /// The instruction where execution starts.
    pub const START: InstrId = 0;

    /// Number of instructions in the program.
    #[inline]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    #[inline]
    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    #[inline]
    pub fn instr(&self, id: InstrId) -> &Instr {
        &self.instrs[id]
    }

    /// Number of capture slots.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    /// Number of capture groups, not counting group 0.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.slots / 2 - 1
    }

    /// Returns the index of the group with the given name.
    #[inline]
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Maps group names to group indexes.
    #[inline]
    pub fn group_names(&self) -> &FxHashMap<String, usize> {
        &self.names
    }

    #[inline]
    pub fn flags(&self) -> ProgramFlagSet {
        self.flags
    }

    #[inline]
    pub fn is_longest_match(&self) -> bool {
        self.flags.contains(ProgramFlags::LongestMatch)
    }

    #[inline]
    pub fn is_anchored_start(&self) -> bool {
        self.anchored_start
    }

    /// Bytes that every match starts with.
    #[inline]
    pub fn prefix(&self) -> Option<&Prefix> {
        self.prefix.as_ref()
    }

    /// Returns the program as a literal if it matches a single non-empty
    /// literal and has no capture groups.
    #[inline]
    pub fn as_literal(&self) -> Option<&Prefix> {
        self.prefix
            .as_ref()
            .filter(|p| p.is_complete() && !p.is_empty() && self.slots == 2)
    }

    /// Bytes that can appear at the start of a match. `None` if the program
    /// can match the empty string.
    #[inline]
    pub fn first_bytes(&self) -> Option<&ByteSet> {
        self.first_bytes.as_ref()
    }

    #[inline]
    pub fn is_one_pass(&self) -> bool {
        self.onepass.is_some()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            size: self.len(),
            one_pass: self.is_one_pass(),
            literal: self.as_literal().is_some(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (id, instr) in self.instrs.iter().enumerate() {
            writeln!(f, "{:05}: {}", id, instr)?;
        }
        Ok(())
    }
}
