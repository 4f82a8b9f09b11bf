/*!
This module provides a compiler that takes a regexp's [`Ast`] and produces
a [`Program`] that can be executed by any of the engines.

The compiler follows the [Thompson's construction][1] algorithm. Each node
in the AST is translated into a fragment of code with a single entry point
and a list of "holes", which are the jumps that leave the fragment and whose
destination is not known yet. When fragments are combined, the holes in one
fragment are patched to point to the entry of the next one.

Programs operate on bytes. Characters and classes are translated into the
byte sequences that form their UTF-8 encoding, so the engines never need to
decode UTF-8.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
*/

use bitvec::vec::BitVec;
use log::*;
use regex_syntax::hir::ClassUnicode;
use regex_syntax::utf8::Utf8Sequences;
use rustc_hash::FxHashMap;

use crate::re::ast::{Ast, Literal, Repetition};
use crate::re::literal::{ByteSet, Prefix};
use crate::re::onepass::OnePass;
use crate::re::thompson::instr::{
    Instr, InstrId, Program, ProgramFlagSet, Transition, PENDING,
};
use crate::re::{unicode, Error, Look, DEFAULT_SIZE_LIMIT};

/// A jump whose destination is still unknown.
#[derive(Clone, Copy, Debug)]
enum Hole {
    /// The `next` field of an instruction with a single successor.
    Next(InstrId),
    /// The first alternative of a split.
    Split1(InstrId),
    /// The second alternative of a split.
    Split2(InstrId),
    /// The n-th transition of a [`Instr::ByteRange`] or [`Instr::Sparse`].
    Transition(InstrId, usize),
}

/// A piece of compiled code with a single entry point.
struct Frag {
    start: InstrId,
    holes: Vec<Hole>,
}

/// Compiles an [`Ast`] into a [`Program`].
pub(crate) struct Compiler {
    instrs: Vec<Instr>,
    size_limit: usize,
    flags: ProgramFlagSet,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            instrs: Vec::new(),
            size_limit: DEFAULT_SIZE_LIMIT,
            flags: ProgramFlagSet::none(),
        }
    }

    /// Maximum number of instructions in the program.
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Flags stored in the resulting program.
    pub fn flags(mut self, flags: ProgramFlagSet) -> Self {
        self.flags = flags;
        self
    }

    pub fn compile(mut self, ast: &Ast) -> Result<Program, Error> {
        // The whole regexp is wrapped in group 0.
        let start = self.emit(Instr::Capture { slot: 0, next: PENDING })?;
        debug_assert_eq!(start, Program::START);

        let body = self.c(ast)?;
        self.patch(&[Hole::Next(start)], body.start);

        let end = self.emit(Instr::Capture { slot: 1, next: PENDING })?;
        self.patch(&body.holes, end);

        let match_ = self.emit(Instr::Match)?;
        self.patch(&[Hole::Next(end)], match_);

        let slots = 2 * (ast.capture_count() as usize + 1);

        let mut names = FxHashMap::default();
        ast.for_each_named_capture(&mut |index, name| {
            names.insert(name.to_string(), index as usize);
        });

        let (prefix, anchored_start) = literal_prefix(&self.instrs);
        let first_bytes = first_bytes(&self.instrs);
        let onepass = OnePass::new(&self.instrs, slots);

        debug!(
            "compiled regexp: {} instructions, {} slots, one-pass: {}, \
             prefix: {:?}",
            self.instrs.len(),
            slots,
            onepass.is_some(),
            prefix.as_ref().map(|p| p.as_bytes())
        );

        Ok(Program {
            instrs: self.instrs,
            slots,
            flags: self.flags,
            names,
            anchored_start,
            prefix,
            first_bytes,
            onepass,
        })
    }

    fn c(&mut self, ast: &Ast) -> Result<Frag, Error> {
        match ast {
            Ast::Empty => self.c_empty(),
            Ast::Literal(lit) => self.c_literal(lit),
            Ast::Class(class) => self.c_class(&class.to_unicode_class()),
            Ast::Look(look) => self.c_look(*look),
            Ast::Repetition(rep) => self.c_repetition(rep),
            Ast::Capture(cap) => self.c_capture(cap.index as usize, &cap.sub),
            Ast::Concat(items) => {
                let mut frags = Vec::with_capacity(items.len());
                for item in items {
                    frags.push(self.c(item)?);
                }
                self.c_concat(frags)
            }
            Ast::Alternation(alternatives) => {
                self.c_alternation(alternatives)
            }
        }
    }

    fn c_empty(&mut self) -> Result<Frag, Error> {
        let id = self.emit(Instr::Nop(PENDING))?;
        Ok(Frag { start: id, holes: vec![Hole::Next(id)] })
    }

    fn c_look(&mut self, look: Look) -> Result<Frag, Error> {
        let id = self.emit(Instr::Look { look, next: PENDING })?;
        Ok(Frag { start: id, holes: vec![Hole::Next(id)] })
    }

    fn c_capture(&mut self, index: usize, sub: &Ast) -> Result<Frag, Error> {
        let start =
            self.emit(Instr::Capture { slot: 2 * index, next: PENDING })?;
        let sub = self.c(sub)?;
        self.patch(&[Hole::Next(start)], sub.start);
        let end =
            self.emit(Instr::Capture { slot: 2 * index + 1, next: PENDING })?;
        self.patch(&sub.holes, end);
        Ok(Frag { start, holes: vec![Hole::Next(end)] })
    }

    /// Joins fragments one after the other.
    fn c_concat(&mut self, frags: Vec<Frag>) -> Result<Frag, Error> {
        let mut frags = frags.into_iter();
        let mut result = match frags.next() {
            Some(first) => first,
            None => return self.c_empty(),
        };
        for frag in frags {
            self.patch(&result.holes, frag.start);
            result.holes = frag.holes;
        }
        Ok(result)
    }

    /// Alternatives are compiled as a chain of splits, where the first
    /// branch of each split is one of the alternatives and the second
    /// branch goes to the next split in the chain. This gives priority to
    /// the alternatives that appear first.
    ///
    /// ```text
    /// a|b|c
    ///
    ///         split l1, l2
    /// l1:     a
    ///         jmp end
    /// l2:     split l3, l4
    /// l3:     b
    ///         jmp end
    /// l4:     c
    /// end:
    /// ```
    fn c_alternation(&mut self, alternatives: &[Ast]) -> Result<Frag, Error> {
        let (last, rest) = match alternatives.split_last() {
            Some(split) => split,
            None => return self.c_empty(),
        };

        let mut start = None;
        let mut holes = Vec::new();
        let mut prev_split: Option<InstrId> = None;

        for alternative in rest {
            let split = self.emit(Instr::Split(PENDING, PENDING))?;
            match prev_split {
                Some(prev) => self.patch(&[Hole::Split2(prev)], split),
                None => start = Some(split),
            }
            let frag = self.c(alternative)?;
            self.patch(&[Hole::Split1(split)], frag.start);
            holes.extend(frag.holes);
            prev_split = Some(split);
        }

        let frag = self.c(last)?;
        holes.extend(frag.holes);

        match prev_split {
            Some(prev) => self.patch(&[Hole::Split2(prev)], frag.start),
            None => start = Some(frag.start),
        }

        Ok(Frag { start: start.unwrap_or(frag.start), holes })
    }

    fn c_repetition(&mut self, rep: &Repetition) -> Result<Frag, Error> {
        let greedy = rep.greedy;
        match (rep.min, rep.max) {
            (0, None) => self.c_star(&rep.sub, greedy),
            (1, None) => self.c_plus(&rep.sub, greedy),
            // `e{n,}` is `e{n-1}e+`.
            (min, None) => {
                let mut frags = Vec::with_capacity(min as usize);
                for _ in 0..min - 1 {
                    frags.push(self.c(&rep.sub)?);
                }
                frags.push(self.c_plus(&rep.sub, greedy)?);
                self.c_concat(frags)
            }
            // `e{n,m}` is `e` repeated `n` times, followed by `m-n` nested
            // optional copies of `e`, as in `eee(e(e)?)?`.
            //
            // ```text
            // e{2,4}
            //
            //          e
            //          e
            //          split l1, end
            //   l1:    e
            //          split l2, end
            //   l2:    e
            //   end:
            // ```
            (min, Some(max)) => {
                let mut frags = Vec::with_capacity(min as usize + 1);
                for _ in 0..min {
                    frags.push(self.c(&rep.sub)?);
                }
                if max > min {
                    frags.push(self.c_optional_chain(
                        &rep.sub,
                        max - min,
                        greedy,
                    )?);
                }
                self.c_concat(frags)
            }
        }
    }

    /// `e*`
    ///
    /// ```text
    /// l0:  split l1, end
    /// l1:  e
    ///      jmp l0
    /// end:
    /// ```
    fn c_star(&mut self, sub: &Ast, greedy: bool) -> Result<Frag, Error> {
        let split = self.emit(Instr::Split(PENDING, PENDING))?;
        let body = self.c(sub)?;
        self.patch(&body.holes, split);
        let (enter, exit) = split_holes(split, greedy);
        self.patch(&[enter], body.start);
        Ok(Frag { start: split, holes: vec![exit] })
    }

    /// `e+`
    ///
    /// ```text
    /// l0:  e
    ///      split l0, end
    /// end:
    /// ```
    fn c_plus(&mut self, sub: &Ast, greedy: bool) -> Result<Frag, Error> {
        let body = self.c(sub)?;
        let split = self.emit(Instr::Split(PENDING, PENDING))?;
        self.patch(&body.holes, split);
        let (enter, exit) = split_holes(split, greedy);
        self.patch(&[enter], body.start);
        Ok(Frag { start: body.start, holes: vec![exit] })
    }

    /// `n` nested optional copies of `e`, as in `(e(e(e)?)?)?` for `n = 3`.
    fn c_optional_chain(
        &mut self,
        sub: &Ast,
        n: u32,
        greedy: bool,
    ) -> Result<Frag, Error> {
        let mut start = None;
        let mut exits = Vec::with_capacity(n as usize + 1);
        let mut pending: Vec<Hole> = Vec::new();

        for _ in 0..n {
            let split = self.emit(Instr::Split(PENDING, PENDING))?;
            if start.is_none() {
                start = Some(split);
            }
            self.patch(&pending, split);
            let body = self.c(sub)?;
            let (enter, exit) = split_holes(split, greedy);
            self.patch(&[enter], body.start);
            exits.push(exit);
            pending = body.holes;
        }

        exits.extend(pending);

        match start {
            Some(start) => Ok(Frag { start, holes: exits }),
            None => self.c_empty(),
        }
    }

    fn c_literal(&mut self, lit: &Literal) -> Result<Frag, Error> {
        let mut frags = Vec::new();
        let mut bytes = Vec::new();
        let mut buf = [0; 4];

        for c in &lit.chars {
            if lit.fold && unicode::has_case_variants(*c) {
                if !bytes.is_empty() {
                    frags.push(self.c_bytes(&bytes)?);
                    bytes.clear();
                }
                frags.push(self.c_class(&unicode::fold_orbit(*c))?);
            } else {
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }

        if !bytes.is_empty() {
            frags.push(self.c_bytes(&bytes)?);
        }

        self.c_concat(frags)
    }

    /// A sequence of bytes that must appear one after the other.
    fn c_bytes(&mut self, bytes: &[u8]) -> Result<Frag, Error> {
        let mut start = None;
        let mut prev: Option<InstrId> = None;

        for b in bytes {
            let id = self.emit(Instr::ByteRange(Transition {
                start: *b,
                end: *b,
                next: PENDING,
            }))?;
            match prev {
                Some(prev) => self.patch(&[Hole::Next(prev)], id),
                None => start = Some(id),
            }
            prev = Some(id);
        }

        match (start, prev) {
            (Some(start), Some(last)) => {
                Ok(Frag { start, holes: vec![Hole::Next(last)] })
            }
            _ => self.c_empty(),
        }
    }

    /// Compiles a set of characters as the UTF-8 automaton that matches any
    /// of them.
    ///
    /// The UTF-8 encodings of the characters are arranged in a trie, where
    /// each node becomes a [`Instr::ByteRange`] or a [`Instr::Sparse`]
    /// instruction. For instance, `[a-zα-ω]` is compiled as:
    ///
    /// ```text
    /// 00000: SPARSE 0x61-0x7a -> end, 0xce -> 00001, 0xcf -> 00002
    /// 00001: RANGE 0xb1-0xbf -> end
    /// 00002: RANGE 0x80-0x89 -> end
    /// ```
    fn c_class(&mut self, class: &ClassUnicode) -> Result<Frag, Error> {
        if class.ranges().is_empty() {
            let id = self.emit(Instr::Fail)?;
            return Ok(Frag { start: id, holes: Vec::new() });
        }

        let mut trie = Utf8Trie::new();
        for range in class.ranges() {
            for seq in Utf8Sequences::new(range.start(), range.end()) {
                trie.insert(seq.as_slice().iter().map(|r| (r.start, r.end)));
            }
        }

        let mut holes = Vec::new();
        let start = self.c_trie_node(&trie, 0, &mut holes)?;

        Ok(Frag { start, holes })
    }

    fn c_trie_node(
        &mut self,
        trie: &Utf8Trie,
        node: usize,
        holes: &mut Vec<Hole>,
    ) -> Result<InstrId, Error> {
        // The node's instruction is emitted before its children, it's
        // replaced with the real instruction once the children are known.
        let id = self.emit(Instr::Fail)?;
        let edges = &trie.nodes[node];
        let mut transitions = Vec::with_capacity(edges.len());

        for (i, edge) in edges.iter().enumerate() {
            let next = match edge.child {
                Some(child) => self.c_trie_node(trie, child, holes)?,
                None => {
                    holes.push(Hole::Transition(id, i));
                    PENDING
                }
            };
            transitions.push(Transition {
                start: edge.start,
                end: edge.end,
                next,
            });
        }

        debug_assert!(transitions.windows(2).all(|w| w[0].end < w[1].start));

        self.instrs[id] = if transitions.len() == 1 {
            Instr::ByteRange(transitions[0])
        } else {
            Instr::Sparse(transitions.into_boxed_slice())
        };

        Ok(id)
    }

    fn emit(&mut self, instr: Instr) -> Result<InstrId, Error> {
        if self.instrs.len() >= self.size_limit {
            return Err(Error::TooLarge { limit: self.size_limit });
        }
        self.instrs.push(instr);
        Ok(self.instrs.len() - 1)
    }

    fn patch(&mut self, holes: &[Hole], target: InstrId) {
        for hole in holes {
            match (*hole, &mut self.instrs[hole_instr(hole)]) {
                (Hole::Next(_), Instr::ByteRange(t)) => t.next = target,
                (Hole::Next(_), Instr::Capture { next, .. })
                | (Hole::Next(_), Instr::Look { next, .. })
                | (Hole::Next(_), Instr::Nop(next)) => *next = target,
                (Hole::Split1(_), Instr::Split(a, _)) => *a = target,
                (Hole::Split2(_), Instr::Split(_, b)) => *b = target,
                (Hole::Transition(_, 0), Instr::ByteRange(t)) => {
                    t.next = target
                }
                (Hole::Transition(_, i), Instr::Sparse(transitions)) => {
                    transitions[i].next = target
                }
                (hole, instr) => {
                    unreachable!("can't patch {:?} in {:?}", hole, instr)
                }
            }
        }
    }
}

fn hole_instr(hole: &Hole) -> InstrId {
    match hole {
        Hole::Next(id)
        | Hole::Split1(id)
        | Hole::Split2(id)
        | Hole::Transition(id, _) => *id,
    }
}

/// Returns the holes of a split that enter a loop or optional body and
/// that exit from it. Greedy splits prefer entering the body.
fn split_holes(split: InstrId, greedy: bool) -> (Hole, Hole) {
    if greedy {
        (Hole::Split1(split), Hole::Split2(split))
    } else {
        (Hole::Split2(split), Hole::Split1(split))
    }
}

struct TrieEdge {
    start: u8,
    end: u8,
    /// `None` for the edges that complete a character.
    child: Option<usize>,
}

/// Trie of UTF-8 byte range sequences, node 0 is the root.
struct Utf8Trie {
    nodes: Vec<Vec<TrieEdge>>,
}

impl Utf8Trie {
    fn new() -> Self {
        Self { nodes: vec![Vec::new()] }
    }

    /// Inserts a sequence of byte ranges. Sequences must be inserted in
    /// ascending order, which is the order produced by [`Utf8Sequences`]
    /// for sorted ranges of characters.
    fn insert<I>(&mut self, seq: I)
    where
        I: ExactSizeIterator<Item = (u8, u8)>,
    {
        let len = seq.len();
        let mut node = 0;
        for (i, (start, end)) in seq.enumerate() {
            if i == len - 1 {
                self.nodes[node].push(TrieEdge { start, end, child: None });
                break;
            }
            node = match self.nodes[node].last() {
                Some(TrieEdge { start: s, end: e, child: Some(child) })
                    if *s == start && *e == end =>
                {
                    *child
                }
                _ => {
                    let child = self.nodes.len();
                    self.nodes.push(Vec::new());
                    self.nodes[node].push(TrieEdge {
                        start,
                        end,
                        child: Some(child),
                    });
                    child
                }
            };
        }
    }
}

/// Computes the bytes that every match must start with, by following the
/// program from the start as long as there's a single path. Returns the
/// prefix, if any, and whether the program is anchored at the start of the
/// input.
fn literal_prefix(instrs: &[Instr]) -> (Option<Prefix>, bool) {
    let mut ip = Program::START;
    let mut bytes = Vec::new();
    let mut anchored = false;
    let mut has_groups = false;
    let mut complete = false;

    for _ in 0..instrs.len() {
        match &instrs[ip] {
            Instr::Capture { slot, next } => {
                has_groups |= *slot >= 2;
                ip = *next;
            }
            Instr::Nop(next) => ip = *next,
            Instr::Look { look: Look::StartText, next }
                if bytes.is_empty() =>
            {
                anchored = true;
                ip = *next;
            }
            Instr::ByteRange(t) if t.start == t.end => {
                bytes.push(t.start);
                ip = t.next;
            }
            Instr::Match => {
                complete = !anchored && !has_groups;
                break;
            }
            _ => break,
        }
    }

    let prefix = if bytes.is_empty() {
        None
    } else {
        Some(Prefix::new(&bytes, complete))
    };

    (prefix, anchored)
}

/// Computes the set of bytes that can be consumed first by the program.
/// Returns `None` if the program can match without consuming any byte.
fn first_bytes(instrs: &[Instr]) -> Option<ByteSet> {
    let mut set = ByteSet::new();
    let mut visited: BitVec = BitVec::repeat(false, instrs.len());
    let mut stack = vec![Program::START];

    while let Some(ip) = stack.pop() {
        if visited[ip] {
            continue;
        }
        visited.set(ip, true);
        match &instrs[ip] {
            Instr::ByteRange(_) | Instr::Sparse(_) => {
                for t in instrs[ip].transitions() {
                    set.add_range(t.start, t.end);
                }
            }
            Instr::Split(a, b) => {
                stack.push(*b);
                stack.push(*a);
            }
            Instr::Capture { next, .. }
            | Instr::Look { next, .. }
            | Instr::Nop(next) => stack.push(*next),
            Instr::Fail => {}
            Instr::Match => return None,
        }
    }

    Some(set)
}
