use bitvec::vec::BitVec;

use crate::re::thompson::instr::InstrId;

/// The set of threads alive at some position of the input.
///
/// Each thread is identified by the instruction it points to, and as in any
/// set, the threads are guaranteed to be unique: the `insert` operation is a
/// no-op if there's already a thread at the same instruction. Threads can
/// be iterated in insertion order, which is also their priority order.
///
/// Membership is checked with a bitmap that has one bit per instruction in
/// the program, so the set is sized for a program when it's created. Every
/// thread also has a row of capture slots, stored in a flat table with one
/// row per instruction. Rows are not cleared when the set is cleared, they
/// must be written before being read.
#[derive(Debug, Default)]
pub(crate) struct ThreadSet {
    // Instructions in the set, in insertion order.
    items: Vec<InstrId>,
    // One bit per instruction, set if the instruction is in `items`.
    bitmap: BitVec,
    // Capture slots, `stride` slots per instruction.
    slots: Vec<Option<usize>>,
    stride: usize,
}

impl ThreadSet {
    pub fn new(capacity: usize, stride: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            bitmap: BitVec::repeat(false, capacity),
            slots: vec![None; capacity * stride],
            stride,
        }
    }

    /// Makes sure that the set can hold every instruction of a program with
    /// `capacity` instructions, with `stride` slots per thread. The set is
    /// cleared.
    pub fn resize(&mut self, capacity: usize, stride: usize) {
        self.clear();
        if self.bitmap.len() != capacity || self.stride != stride {
            *self = Self::new(capacity, stride);
        }
    }

    /// Adds a thread at instruction `ip`.
    ///
    /// Returns `true` if the thread didn't exist and was added, and `false`
    /// if there was a thread at that instruction already.
    #[inline]
    pub fn insert(&mut self, ip: InstrId) -> bool {
        if self.contains(ip) {
            return false;
        }
        self.bitmap.set(ip, true);
        self.items.push(ip);
        true
    }

    #[inline]
    pub fn contains(&self, ip: InstrId) -> bool {
        self.bitmap[ip]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the `i`-th thread in insertion order.
    #[inline]
    pub fn get(&self, i: usize) -> InstrId {
        self.items[i]
    }

    /// Capture slots of the thread at instruction `ip`.
    #[inline]
    pub fn slots(&self, ip: InstrId) -> &[Option<usize>] {
        &self.slots[ip * self.stride..(ip + 1) * self.stride]
    }

    #[inline]
    pub fn slots_mut(&mut self, ip: InstrId) -> &mut [Option<usize>] {
        &mut self.slots[ip * self.stride..(ip + 1) * self.stride]
    }

    /// Removes all threads in the set.
    #[inline]
    pub fn clear(&mut self) {
        for ip in self.items.drain(0..) {
            self.bitmap.set(ip, false);
        }
    }

    /// Returns an iterator for the threads in the set.
    ///
    /// Threads are returned in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = InstrId> + '_ {
        self.items.iter().copied()
    }
}
