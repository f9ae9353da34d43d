//! Wavefront storage: one `Wavefront` per (component, score), collected in a
//! score-indexed `Component`.
//!
//! Diagonals are signed (`k = h - v`), so a wavefront folds both wings into a
//! single vec: k=0 maps to slot 0, positive k to the even slots `2k`, negative
//! k to the odd slots `2|k|-1`. Growth is a single append of a fixed block of
//! zeroed slots, and zero is the "no cell here" sentinel.

use crate::offset::{pack, split, BackTag};
use std::cmp::{max, min};

/// Slots added per grow call.
const GROW_BLOCK: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Wavefront {
    slots: Vec<u32>,
    lo: i32,
    hi: i32,
}

/// Interleaved physical index for a signed diagonal.
fn slot_index(k: i32) -> usize {
    if k >= 0 {
        2 * k as usize
    } else {
        2 * (-k) as usize - 1
    }
}

impl Wavefront {
    pub(crate) fn new() -> Wavefront {
        Wavefront {
            slots: Vec::new(),
            lo: 0,
            hi: 0,
        }
    }

    /// Zero every slot and reset the range, keeping the allocation.
    pub(crate) fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = 0);
        self.lo = 0;
        self.hi = 0;
    }

    pub(crate) fn lo(&self) -> i32 {
        self.lo
    }

    pub(crate) fn hi(&self) -> i32 {
        self.hi
    }

    fn grow_to(&mut self, idx: usize) {
        if idx >= self.slots.len() {
            let target = (idx / GROW_BLOCK + 1) * GROW_BLOCK;
            self.slots.resize(target, 0);
        }
    }

    pub(crate) fn set(&mut self, k: i32, offset: u32, tag: BackTag) {
        self.set_raw(k, pack(offset, tag));
    }

    /// Store a pre-packed slot value, extending the range to cover k.
    pub(crate) fn set_raw(&mut self, k: i32, packed: u32) {
        let idx = slot_index(k);
        self.grow_to(idx);
        self.slots[idx] = packed;
        self.lo = min(self.lo, k);
        self.hi = max(self.hi, k);
    }

    /// Advance the offset part of a cell, leaving the tag untouched.
    /// The cell must already be present.
    pub(crate) fn increase(&mut self, k: i32, delta: u32) {
        let idx = slot_index(k);
        self.slots[idx] += delta << crate::offset::TAG_BITS;
    }

    /// Returns (offset, tag, present). A cell is present when k is inside
    /// the tracked range and the slot holds a non-zero value.
    pub(crate) fn get(&self, k: i32) -> (u32, BackTag, bool) {
        if k < self.lo || k > self.hi {
            return (0, BackTag::Unknown, false);
        }
        let idx = slot_index(k);
        match self.slots.get(idx) {
            Some(&packed) if packed != 0 => {
                let (offset, tag) = split(packed);
                (offset, tag, true)
            }
            _ => (0, BackTag::Unknown, false),
        }
    }

    /// Zero a cell. The range only contracts when k sits exactly on an
    /// endpoint; interior deletions leave a loose bound, which is fine
    /// since every read is presence-checked.
    pub(crate) fn delete(&mut self, k: i32) {
        if k < self.lo || k > self.hi {
            return;
        }
        let idx = slot_index(k);
        if idx < self.slots.len() {
            self.slots[idx] = 0;
        }
        if k == self.lo {
            self.lo += 1;
        }
        if k == self.hi {
            self.hi -= 1;
        }
    }

    /// Overwrite the tracked range. Used by adaptive reduction after
    /// pruning the wings.
    pub(crate) fn set_range(&mut self, lo: i32, hi: i32) {
        self.lo = lo;
        self.hi = hi;
    }
}

/// Score-indexed directory of wavefronts for one of the M/I/D components.
/// The score axis is sparse: scores nothing ever wrote to stay `None`.
/// Cleared wavefronts are recycled through `spare` so aligning many pairs
/// with one aligner does not reallocate.
#[derive(Debug, Default)]
pub(crate) struct Component {
    scores: Vec<Option<Wavefront>>,
    spare: Vec<Wavefront>,
}

impl Component {
    pub(crate) fn new() -> Component {
        Component::default()
    }

    /// Recycle every wavefront for the next alignment.
    pub(crate) fn clear(&mut self) {
        for slot in self.scores.drain(..) {
            if let Some(mut wf) = slot {
                wf.reset();
                self.spare.push(wf);
            }
        }
    }

    pub(crate) fn has_score(&self, s: u32) -> bool {
        matches!(self.scores.get(s as usize), Some(Some(_)))
    }

    pub(crate) fn wavefront(&self, s: u32) -> Option<&Wavefront> {
        self.scores.get(s as usize).and_then(|w| w.as_ref())
    }

    pub(crate) fn wavefront_mut(&mut self, s: u32) -> Option<&mut Wavefront> {
        self.scores.get_mut(s as usize).and_then(|w| w.as_mut())
    }

    /// The wavefront at s, created (or recycled) on first touch.
    pub(crate) fn ensure(&mut self, s: u32) -> &mut Wavefront {
        let s = s as usize;
        if s >= self.scores.len() {
            self.scores.resize(s + 1, None);
        }
        if self.scores[s].is_none() {
            let wf = self.spare.pop().unwrap_or_else(Wavefront::new);
            self.scores[s] = Some(wf);
        }
        self.scores[s].as_mut().expect("just inserted")
    }

    /// Diagonal range of the wavefront at `s - diff`, or (0, 0) when that
    /// score is out of reach or vacant.
    pub(crate) fn k_range(&self, s: u32, diff: u32) -> (i32, i32) {
        if diff > s {
            return (0, 0);
        }
        match self.wavefront(s - diff) {
            Some(wf) => (wf.lo(), wf.hi()),
            None => (0, 0),
        }
    }

    pub(crate) fn get(&self, s: u32, k: i32) -> (u32, BackTag, bool) {
        match self.wavefront(s) {
            Some(wf) => wf.get(k),
            None => (0, BackTag::Unknown, false),
        }
    }

    /// Get at `s - diff`, tolerant of underflow.
    pub(crate) fn get_diff(&self, s: u32, diff: u32, k: i32) -> (u32, BackTag, bool) {
        if diff > s {
            return (0, BackTag::Unknown, false);
        }
        self.get(s - diff, k)
    }

    pub(crate) fn set(&mut self, s: u32, k: i32, offset: u32, tag: BackTag) {
        self.ensure(s).set(k, offset, tag);
    }

    pub(crate) fn delete(&mut self, s: u32, k: i32) {
        if let Some(wf) = self.wavefront_mut(s) {
            wf.delete(k);
        }
    }
}
