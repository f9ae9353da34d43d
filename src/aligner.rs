//! The wavefront engine: EXTEND / NEXT over the three M/I/D components,
//! adaptive reduction, and the backtrace that rebuilds an alignment from
//! the provenance tags packed into the offsets.

use crate::alignment_lib::{AdaptiveParams, AlignMode, AlignmentError, Penalties};
use crate::offset::{BackTag, MAX_SEQ_LEN};
use crate::result::{AlignOp, AlignmentResult, Region};
use crate::wavefront::{Component, Wavefront};
use log::{debug, trace};
use std::cmp::{max, min};

/// Gap-affine wavefront aligner.
///
/// Owns the M/I/D wavefront components and reuses their storage across
/// `align` calls, so aligning many pairs with one instance amortizes
/// allocation. One aligner per thread; parallel callers construct one each.
pub struct Aligner {
    pens: Penalties,
    mode: AlignMode,
    adaptive: Option<AdaptiveParams>,
    matches: Component,
    inserts: Component,
    deletes: Component,
}

impl Aligner {
    /// A new exact aligner. Call [`Aligner::set_adaptive`] to enable
    /// heuristic wavefront reduction.
    pub fn new(pens: Penalties, mode: AlignMode) -> Aligner {
        Aligner {
            pens,
            mode,
            adaptive: None,
            matches: Component::new(),
            inserts: Component::new(),
            deletes: Component::new(),
        }
    }

    /// Enable adaptive reduction. Wavefronts at least `min_wf_len` wide are
    /// scanned every `cutoff_step` scores, and diagonals trailing the
    /// leading one by more than `max_dist_diff` are pruned.
    pub fn set_adaptive(
        &mut self,
        min_wf_len: usize,
        max_dist_diff: u32,
        cutoff_step: u32,
    ) -> Result<(), AlignmentError> {
        if min_wf_len == 0 {
            return Err(AlignmentError::InvalidAdaptiveParams);
        }
        self.adaptive = Some(AdaptiveParams {
            min_wf_len,
            max_dist_diff,
            cutoff_step: max(cutoff_step, 1),
        });
        Ok(())
    }

    /// Align `query` against `target` and reconstruct the full alignment.
    pub fn align(&mut self, query: &[u8], target: &[u8]) -> Result<AlignmentResult, AlignmentError> {
        let n = query.len();
        let m = target.len();
        if n == 0 || m == 0 {
            return Err(AlignmentError::EmptySequence { query: n, target: m });
        }
        if n > MAX_SEQ_LEN {
            return Err(AlignmentError::SequenceTooLong { len: n });
        }
        if m > MAX_SEQ_LEN {
            return Err(AlignmentError::SequenceTooLong { len: m });
        }

        self.matches.clear();
        self.inserts.clear();
        self.deletes.clear();
        self.seed(query, target);

        // The only diagonal on which both sequences can be fully consumed.
        let ak = m as i32 - n as i32;
        debug!("aligning {n} x {m} bytes, {:?}, terminal diagonal {ak}", self.mode);

        let mut s: u32 = 0;
        loop {
            if self.matches.has_score(s) {
                let (lo, hi) = self.extend(s, query, target);
                trace!("score {s}: wavefront [{lo}, {hi}]");
                if self.reached_end(s, ak, m) {
                    break;
                }
                if let Some(ap) = self.adaptive {
                    let width = hi as i64 - lo as i64 + 1;
                    if s % ap.cutoff_step == 0 && width >= ap.min_wf_len as i64 {
                        self.reduce(s, ap, n, m);
                    }
                }
            }
            s += 1;
            self.next(s, n, m);
        }
        debug!("terminated at score {s}");

        let (origin_s, origin_k) = match self.mode {
            AlignMode::Global => (s, ak),
            AlignMode::SemiGlobal => self.semiglobal_origin(s, ak, n, m),
        };
        Ok(self.backtrace(origin_s, origin_k, n, m))
    }

    /// Plant the score-0 / score-x starting cells. Semi-global alignments
    /// may start anywhere on the first row or column, so every such cell
    /// gets a seed with its own match/mismatch outcome.
    fn seed(&mut self, query: &[u8], target: &[u8]) {
        let x = self.pens.mismatch_pen;
        let seed_at = |q: u8, t: u8| {
            if q == t {
                (0, BackTag::Match)
            } else {
                (x, BackTag::Mismatch)
            }
        };

        let (s0, tag) = seed_at(query[0], target[0]);
        self.matches.set(s0, 0, 1, tag);

        if self.mode == AlignMode::SemiGlobal {
            let n = query.len() as i32;
            let m = target.len() as i32;
            for k in 1..m {
                let (s0, tag) = seed_at(query[0], target[k as usize]);
                self.matches.set(s0, k, k as u32 + 1, tag);
            }
            for k in (1 - n)..0 {
                let (s0, tag) = seed_at(query[(-k) as usize], target[0]);
                self.matches.set(s0, k, 1, tag);
            }
        }
    }

    /// Advance every diagonal of M at score s along its run of matching
    /// bytes. Offsets only grow; tags stay as they were, the run is
    /// reconstructed during backtrace. Diagonals are walked from hi down to
    /// lo so the wavefront grows at most once.
    fn extend(&mut self, s: u32, query: &[u8], target: &[u8]) -> (i32, i32) {
        let n = query.len();
        let m = target.len();
        let Some(wf) = self.matches.wavefront_mut(s) else {
            return (0, 0);
        };
        let (lo, hi) = (wf.lo(), wf.hi());

        for k in (lo..=hi).rev() {
            let (offset, _tag, present) = wf.get(k);
            if s > 0 && !present {
                continue;
            }
            let mut h = offset as usize;
            let v0 = offset as i64 - k as i64;
            if v0 < 0 || v0 >= n as i64 || h >= m {
                continue;
            }
            let mut v = v0 as usize;
            let mut advanced: u32 = 0;

            // Eight bytes per probe: XOR the windows and count the leading
            // equal bytes.
            while v + 8 <= n && h + 8 <= m {
                let qw = u64::from_be_bytes(query[v..v + 8].try_into().unwrap());
                let tw = u64::from_be_bytes(target[h..h + 8].try_into().unwrap());
                let diff = qw ^ tw;
                if diff == 0 {
                    v += 8;
                    h += 8;
                    advanced += 8;
                } else {
                    let same = (diff.leading_zeros() / 8) as usize;
                    v += same;
                    h += same;
                    advanced += same as u32;
                    break;
                }
            }
            while v < n && h < m && query[v] == target[h] {
                v += 1;
                h += 1;
                advanced += 1;
            }

            if advanced > 0 {
                wf.increase(k, advanced);
            }
        }
        (lo, hi)
    }

    /// The alignment is done once the terminal diagonal has consumed the
    /// whole target (and with it, the whole query).
    fn reached_end(&self, s: u32, ak: i32, m: usize) -> bool {
        let (offset, _tag, present) = self.matches.get(s, ak);
        present && offset as usize >= m
    }

    /// A source offset, with the boundary guard: a cell already pinned on
    /// the last row or column cannot produce successors.
    fn source(comp: &Component, s: i64, diff: u32, k: i32, n: usize, m: usize) -> Option<u32> {
        if s < 0 {
            return None;
        }
        let (offset, _tag, present) = comp.get_diff(s as u32, diff, k);
        if !present {
            return None;
        }
        if offset as u64 > m as u64 || offset as i64 - k as i64 > n as i64 {
            return None;
        }
        Some(offset)
    }

    fn insert_candidate(&self, s: i64, k: i32, n: usize, m: usize) -> Option<(u32, BackTag)> {
        let oe = self.pens.open_pen + self.pens.extd_pen;
        let from_m = Self::source(&self.matches, s, oe, k - 1, n, m);
        let from_i = Self::source(&self.inserts, s, self.pens.extd_pen, k - 1, n, m);
        match (from_m, from_i) {
            (None, None) => None,
            (Some(a), None) => Some((a + 1, BackTag::InsertOpen)),
            (None, Some(b)) => Some((b + 1, BackTag::InsertExt)),
            (Some(a), Some(b)) => Some(if a >= b {
                (a + 1, BackTag::InsertOpen)
            } else {
                (b + 1, BackTag::InsertExt)
            }),
        }
    }

    fn delete_candidate(&self, s: i64, k: i32, n: usize, m: usize) -> Option<(u32, BackTag)> {
        let oe = self.pens.open_pen + self.pens.extd_pen;
        let from_m = Self::source(&self.matches, s, oe, k + 1, n, m);
        let from_d = Self::source(&self.deletes, s, self.pens.extd_pen, k + 1, n, m);
        match (from_m, from_d) {
            (None, None) => None,
            (Some(a), None) => Some((a, BackTag::DeleteOpen)),
            (None, Some(b)) => Some((b, BackTag::DeleteExt)),
            (Some(a), Some(b)) => Some(if a >= b {
                (a, BackTag::DeleteOpen)
            } else {
                (b, BackTag::DeleteExt)
            }),
        }
    }

    fn mismatch_candidate(&self, s: i64, k: i32, n: usize, m: usize) -> Option<u32> {
        Self::source(&self.matches, s, self.pens.mismatch_pen, k, n, m).map(|v1| v1 + 1)
    }

    /// Fill the wavefronts at score s from the ones at s-x, s-o-e and s-e.
    /// Destinations are processed in ascending diagonal order; ties between
    /// sources resolve as mismatch, then insertion, then deletion.
    fn next(&mut self, s: u32, n: usize, m: usize) {
        let x = self.pens.mismatch_pen;
        let oe = self.pens.open_pen + self.pens.extd_pen;
        let e = self.pens.extd_pen;

        let (mx_lo, mx_hi) = self.matches.k_range(s, x);
        let (mo_lo, mo_hi) = self.matches.k_range(s, oe);
        let (ie_lo, ie_hi) = self.inserts.k_range(s, e);
        let (de_lo, de_hi) = self.deletes.k_range(s, e);

        let lo = min(min(mx_lo, mo_lo), min(ie_lo, de_lo)) - 1;
        let hi = max(max(mx_hi, mo_hi), max(ie_hi, de_hi)) + 1;

        for k in lo..=hi {
            let ins = self.insert_candidate(s as i64, k, n, m);
            let del = self.delete_candidate(s as i64, k, n, m);
            let mis = self.mismatch_candidate(s as i64, k, n, m);

            if let Some((offset, tag)) = ins {
                self.inserts.set(s, k, offset, tag);
            }
            if let Some((offset, tag)) = del {
                self.deletes.set(s, k, offset, tag);
            }

            let best = match (ins, del, mis) {
                (None, None, None) => None,
                (Some(i), None, None) => Some(i),
                (None, Some(d), None) => Some(d),
                (None, None, Some(mx)) => Some((mx, BackTag::Mismatch)),
                (Some(i), Some(d), None) => Some(if i.0 >= d.0 { i } else { d }),
                (Some(i), None, Some(mx)) => Some(if mx >= i.0 {
                    (mx, BackTag::Mismatch)
                } else {
                    i
                }),
                (None, Some(d), Some(mx)) => Some(if mx >= d.0 {
                    (mx, BackTag::Mismatch)
                } else {
                    d
                }),
                (Some(i), Some(d), Some(mx)) => {
                    let top = mx.max(i.0).max(d.0);
                    Some(if mx == top {
                        (mx, BackTag::Mismatch)
                    } else if i.0 == top {
                        i
                    } else {
                        d
                    })
                }
            };
            if let Some((offset, tag)) = best {
                self.matches.set(s, k, offset, tag);
            }
        }
    }

    /// Adaptive reduction: prune diagonals whose remaining-distance
    /// estimate trails the best one by more than the configured slack, in
    /// all three components.
    fn reduce(&mut self, s: u32, ap: AdaptiveParams, n: usize, m: usize) {
        let mut prune: Vec<i32> = Vec::new();
        let (lo, hi, new_lo, new_hi);
        {
            let Some(wf) = self.matches.wavefront(s) else {
                return;
            };
            lo = wf.lo();
            hi = wf.hi();

            let dist = |wf: &Wavefront, k: i32| -> Option<i64> {
                let (offset, _tag, present) = wf.get(k);
                if !present {
                    return None;
                }
                let h = offset as i64;
                let v = h - k as i64;
                Some(max(m as i64 - h, n as i64 - v).max(0))
            };

            let mut d_min = i64::MAX;
            for k in lo..=hi {
                if let Some(d) = dist(wf, k) {
                    d_min = min(d_min, d);
                }
            }
            if d_min == i64::MAX {
                return;
            }

            let slack = ap.max_dist_diff as i64;
            let mut a = lo;
            while a < hi {
                match dist(wf, a) {
                    Some(d) if d - d_min <= slack => break,
                    _ => a += 1,
                }
            }
            new_lo = a;
            let mut b = hi;
            while b > new_lo {
                match dist(wf, b) {
                    Some(d) if d - d_min <= slack => break,
                    _ => b -= 1,
                }
            }
            new_hi = b;

            for k in lo..=hi {
                let outside = k < new_lo || k > new_hi;
                let behind = matches!(dist(wf, k), Some(d) if d - d_min > slack);
                if outside || behind {
                    prune.push(k);
                }
            }
        }

        for &k in &prune {
            self.matches.delete(s, k);
            self.inserts.delete(s, k);
            self.deletes.delete(s, k);
        }
        if let Some(wf) = self.matches.wavefront_mut(s) {
            wf.set_range(new_lo, new_hi);
        }
        debug!(
            "reduced score {s}: [{lo}, {hi}] -> [{new_lo}, {new_hi}], {} diagonals pruned",
            prune.len()
        );
    }

    /// Semi-global alignments end on the last row or column, not
    /// necessarily at the corner. Scan for the cheapest such cell: lowest
    /// score first, and within a score the diagonal nearest the terminal
    /// one, looking below it before above it.
    fn semiglobal_origin(&self, final_s: u32, ak: i32, n: usize, m: usize) -> (u32, i32) {
        for s in 0..=final_s {
            let Some(wf) = self.matches.wavefront(s) else {
                continue;
            };
            let (lo, hi) = (wf.lo(), wf.hi());
            let span = max(ak - lo, hi - ak).max(0);
            for d in 0..=span {
                let below = ak - d;
                let above = ak + d;
                for k in [below, above] {
                    if d == 0 && k == above && below == above {
                        continue;
                    }
                    if k < lo || k > hi {
                        continue;
                    }
                    let (offset, _tag, present) = wf.get(k);
                    if !present {
                        continue;
                    }
                    let h = offset as i64;
                    let v = h - k as i64;
                    if (v == n as i64 && h >= n as i64) || (h == m as i64 && v >= m as i64) {
                        return (s, k);
                    }
                }
            }
        }
        (final_s, ak)
    }

    /// Rebuild the alignment by walking the provenance tags backwards from
    /// the terminal cell, re-deriving each cell's pre-extension offset to
    /// recover the implicit match runs.
    fn backtrace(&self, final_s: u32, origin_k: i32, n: usize, m: usize) -> AlignmentResult {
        let x = self.pens.mismatch_pen as i64;
        let oe = (self.pens.open_pen + self.pens.extd_pen) as i64;
        let e = self.pens.extd_pen as i64;
        let semi = self.mode == AlignMode::SemiGlobal;

        let mut ops: Vec<AlignOp> = Vec::new();
        let mut region = Region::default();
        let mut seen_end = false;

        let (start_off, mut tag, present) = self.matches.get(final_s, origin_k);
        if !present {
            return AlignmentResult::from_backtrace(final_s, ops, region);
        }

        let mut s = final_s as i64;
        let mut k = origin_k;
        let mut h = start_off as i64;
        let mut v = h - k as i64;
        let mut prev_from_m = true;

        // Everything after the terminal cell is free in semi-global mode.
        // Pushed first: ops accumulate in reverse.
        if semi {
            for _ in 0..(n as i64 - v).max(0) {
                ops.push(AlignOp::Clip);
            }
            for _ in 0..(m as i64 - h).max(0) {
                ops.push(AlignOp::Insert);
            }
        }

        loop {
            if v <= 0 || h <= 0 {
                break;
            }
            if semi && (h == 1 || v == 1) {
                break;
            }
            // Only seeds carry these; the run they absorbed is emitted by
            // the final-run logic below.
            if matches!(tag, BackTag::Match | BackTag::Unknown) {
                break;
            }

            // Un-extended offset of the current cell: replay the NEXT
            // arithmetic that produced it.
            let h0 = match tag {
                BackTag::InsertExt => self.insert_candidate(s, k, n, m).map(|(o, _)| o as i64),
                BackTag::DeleteExt => self.delete_candidate(s, k, n, m).map(|(o, _)| o as i64),
                _ => {
                    let ins = self.insert_candidate(s, k, n, m).map(|(o, _)| o);
                    let del = self.delete_candidate(s, k, n, m).map(|(o, _)| o);
                    let mis = self.mismatch_candidate(s, k, n, m);
                    [ins, del, mis].into_iter().flatten().max().map(|o| o as i64)
                }
            };
            let Some(h0) = h0 else {
                break;
            };

            if prev_from_m && h - h0 > 0 {
                let run = h - h0;
                for _ in 0..run {
                    ops.push(AlignOp::Match);
                }
                if !seen_end {
                    region.q_end = v as usize;
                    region.t_end = h as usize;
                    seen_end = true;
                }
                region.q_begin = (v - run + 1) as usize;
                region.t_begin = (h - run + 1) as usize;
                h = h0;
                v = h - k as i64;
            }

            match tag {
                BackTag::Mismatch => {
                    ops.push(AlignOp::Mismatch);
                    s -= x;
                    h -= 1;
                }
                BackTag::InsertOpen => {
                    ops.push(AlignOp::Insert);
                    s -= oe;
                    k -= 1;
                    h -= 1;
                }
                BackTag::InsertExt => {
                    ops.push(AlignOp::Insert);
                    s -= e;
                    k -= 1;
                    h -= 1;
                }
                BackTag::DeleteOpen => {
                    ops.push(AlignOp::Delete);
                    s -= oe;
                    k += 1;
                }
                BackTag::DeleteExt => {
                    ops.push(AlignOp::Delete);
                    s -= e;
                    k += 1;
                }
                BackTag::Match | BackTag::Unknown => unreachable!(),
            }
            v = h - k as i64;

            let source_comp = match tag {
                BackTag::InsertExt => &self.inserts,
                BackTag::DeleteExt => &self.deletes,
                _ => &self.matches,
            };
            prev_from_m = !matches!(tag, BackTag::InsertExt | BackTag::DeleteExt);

            if s < 0 {
                break;
            }
            let (_offset, src_tag, present) = source_comp.get(s as u32, k);
            if !present {
                break;
            }
            tag = src_tag;
        }

        // Final run into the corner (global) or the first row/column
        // (semi-global): min(h, v) - 1 matches, then the cell's own op.
        if h > 0 && v > 0 {
            let run = min(h, v) - 1;
            for _ in 0..run {
                ops.push(AlignOp::Match);
            }
            if run > 0 {
                if !seen_end {
                    region.q_end = v as usize;
                    region.t_end = h as usize;
                    seen_end = true;
                }
                region.q_begin = (v - run + 1) as usize;
                region.t_begin = (h - run + 1) as usize;
            }
            let residual = match tag {
                BackTag::Match => Some(AlignOp::Match),
                BackTag::Mismatch => Some(AlignOp::Mismatch),
                BackTag::InsertOpen | BackTag::InsertExt => Some(AlignOp::Insert),
                BackTag::DeleteOpen | BackTag::DeleteExt => Some(AlignOp::Delete),
                BackTag::Unknown => None,
            };
            match residual {
                Some(op) => {
                    ops.push(op);
                    if op == AlignOp::Match {
                        if !seen_end {
                            region.q_end = (v - run) as usize;
                            region.t_end = (h - run) as usize;
                            seen_end = true;
                        }
                        region.q_begin = (v - run) as usize;
                        region.t_begin = (h - run) as usize;
                    }
                    match op {
                        AlignOp::Match | AlignOp::Mismatch => {
                            h -= run + 1;
                            v -= run + 1;
                        }
                        AlignOp::Insert => {
                            h -= run + 1;
                            v -= run;
                        }
                        AlignOp::Delete => {
                            h -= run;
                            v -= run + 1;
                        }
                        AlignOp::Clip => (),
                    }
                }
                None => {
                    h -= run;
                    v -= run;
                }
            }
        }

        // Everything before the aligned region is free in semi-global mode.
        if semi {
            for _ in 0..h.max(0) {
                ops.push(AlignOp::Insert);
            }
            for _ in 0..v.max(0) {
                ops.push(AlignOp::Clip);
            }
        }

        AlignmentResult::from_backtrace(final_s, ops, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::OpRun;

    fn global() -> Aligner {
        Aligner::new(Penalties::default(), AlignMode::Global)
    }

    /// Recompute a global alignment's score from its operation list.
    fn score_from_ops(ops: &[OpRun], pens: &Penalties) -> u32 {
        ops.iter()
            .map(|run| match run.op {
                AlignOp::Mismatch => pens.mismatch_pen * run.len,
                AlignOp::Insert | AlignOp::Delete => pens.open_pen + pens.extd_pen * run.len,
                _ => 0,
            })
            .sum()
    }

    fn consumed(ops: &[OpRun]) -> (u32, u32) {
        let mut q = 0;
        let mut t = 0;
        for run in ops {
            match run.op {
                AlignOp::Match | AlignOp::Mismatch => {
                    q += run.len;
                    t += run.len;
                }
                AlignOp::Insert => t += run.len,
                AlignOp::Delete | AlignOp::Clip => q += run.len,
            }
        }
        (q, t)
    }

    #[test]
    fn test_single_char() {
        let res = global().align(b"C", b"C").unwrap();
        assert_eq!(res.score, 0);
        assert_eq!(res.cigar(), "1M");
        assert_eq!((res.q_begin, res.q_end, res.t_begin, res.t_end), (1, 1, 1, 1));
    }

    #[test]
    fn test_self_alignment() {
        let q = b"GATTACAGATTACA";
        let res = global().align(q, q).unwrap();
        assert_eq!(res.score, 0);
        assert_eq!(res.cigar(), "14M");
        assert_eq!(res.matches, 14);
        assert_eq!(res.align_len, 14);
        assert_eq!(res.gaps, 0);
    }

    #[test]
    fn test_leading_mismatch() {
        let res = global().align(b"GC", b"AC").unwrap();
        assert_eq!(res.score, 4);
        assert_eq!(res.cigar(), "1X1M");
    }

    #[test]
    fn test_mismatches_only() {
        let res = global().align(b"ACCATACTCG", b"AGGATGCTCG").unwrap();
        assert_eq!(res.score, 12);
        assert_eq!(res.cigar(), "1M2X2M1X4M");
        assert_eq!((res.q_begin, res.q_end), (1, 10));
        assert_eq!((res.t_begin, res.t_end), (1, 10));
        assert_eq!(res.matches, 7);
        assert_eq!(res.gaps, 0);
    }

    #[test]
    fn test_two_gap_regions() {
        let res = global()
            .align(
                b"AGCTAGTGTCAATGGCTACTTTTCAGGTCCT",
                b"AACTAAGTGTCGGTGGCTACTATATATCAGGTCCT",
            )
            .unwrap();
        assert_eq!(res.score, 36);
        assert_eq!(res.cigar(), "1M1X3M1I5M2X8M3I1M1X9M");
        assert_eq!(res.matches, 27);
        assert_eq!(res.gaps, 4);
        assert_eq!(res.gap_regions, 2);
    }

    #[test]
    fn test_paper_example_round_trip() {
        let q = b"GATACA";
        let t = b"GAGATA";
        let res = global().align(q, t).unwrap();
        assert!(res.score > 0);
        let (used_q, used_t) = consumed(&res.ops);
        assert_eq!(used_q as usize, q.len());
        assert_eq!(used_t as usize, t.len());
        assert_eq!(res.score, score_from_ops(&res.ops, &Penalties::default()));

        let (q_row, mid, t_row) = res.aligned_rows(q, t);
        assert_eq!(q_row.len(), mid.len());
        assert_eq!(t_row.len(), mid.len());
        assert_eq!(q_row.bytes().filter(|&b| b != b'-').count(), q.len());
        assert_eq!(t_row.bytes().filter(|&b| b != b'-').count(), t.len());
    }

    #[test]
    fn test_semi_global() {
        let mut aligner = Aligner::new(Penalties::default(), AlignMode::SemiGlobal);
        let res = aligner.align(b"ACGATCTCG", b"CAGGCTCCTCGG").unwrap();
        assert_eq!(res.score, 16);
        assert_eq!((res.q_begin, res.q_end), (1, 9));
        assert_eq!((res.t_begin, res.t_end), (2, 11));
        assert_eq!(res.matches, 7);
        assert_eq!(res.gaps, 1);
        assert_eq!(res.gap_regions, 1);
    }

    #[test]
    fn test_first_pair_always_aligned() {
        // The seed consumes the first byte pair, so the cheapest path here
        // is a mismatch followed by a gap, not a leading gap.
        let res = global().align(b"B", b"AB").unwrap();
        assert_eq!(res.score, 12);
        assert_eq!(res.cigar(), "1X1I");
    }

    #[test]
    fn test_score_symmetry() {
        let pairs: &[(&[u8], &[u8])] = &[
            (b"GATACA", b"GAGATA"),
            (b"ACCATACTCG", b"AGGATGCTCG"),
            (b"AAAA", b"AAAATTTT"),
            (b"TTGC", b"C"),
        ];
        for (a, b) in pairs {
            let fwd = global().align(a, b).unwrap().score;
            let rev = global().align(b, a).unwrap().score;
            assert_eq!(fwd, rev, "asymmetric score for {:?} / {:?}", a, b);
        }
    }

    #[test]
    fn test_score_matches_operations() {
        let pairs: &[(&[u8], &[u8])] = &[
            (b"GATACA", b"GAGATA"),
            (b"ACCATACTCG", b"AGGATGCTCG"),
            (b"AGCT", b"AGCTAGCTAGCT"),
            (b"TCTTTACTCGCGCGTTGGAGAAATACAATAGT", b"TCTATACTGCGCGTTTGGAGAAATAAAATAGT"),
        ];
        for (q, t) in pairs {
            let res = global().align(q, t).unwrap();
            assert_eq!(
                res.score,
                score_from_ops(&res.ops, &Penalties::default()),
                "inconsistent score for {:?} / {:?}",
                q,
                t
            );
            let (used_q, used_t) = consumed(&res.ops);
            assert_eq!(used_q as usize, q.len());
            assert_eq!(used_t as usize, t.len());
        }
    }

    #[test]
    fn test_stats_add_up() {
        let res = global()
            .align(
                b"AGCTAGTGTCAATGGCTACTTTTCAGGTCCT",
                b"AACTAAGTGTCGGTGGCTACTATATATCAGGTCCT",
            )
            .unwrap();
        let mismatches: u32 = res
            .ops
            .iter()
            .filter(|r| r.op == AlignOp::Mismatch)
            .map(|r| r.len)
            .sum();
        assert_eq!(res.matches + mismatches + res.gaps, res.align_len);
        assert!(res.gap_regions <= res.gaps);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert_eq!(
            global().align(b"", b"ACGT"),
            Err(AlignmentError::EmptySequence { query: 0, target: 4 })
        );
        assert_eq!(
            global().align(b"ACGT", b""),
            Err(AlignmentError::EmptySequence { query: 4, target: 0 })
        );
    }

    #[test]
    fn test_oversized_input_rejected() {
        // Zeroed pages are cheap to allocate; align() bails before reading.
        let too_long = vec![0u8; MAX_SEQ_LEN + 1];
        assert_eq!(
            global().align(&too_long, b"ACGT"),
            Err(AlignmentError::SequenceTooLong { len: MAX_SEQ_LEN + 1 })
        );
    }

    #[test]
    fn test_invalid_adaptive_params() {
        let mut aligner = global();
        assert_eq!(
            aligner.set_adaptive(0, 50, 1),
            Err(AlignmentError::InvalidAdaptiveParams)
        );
        assert!(aligner.set_adaptive(10, 50, 1).is_ok());
    }

    #[test]
    fn test_adaptive_agrees_on_similar_sequences() {
        // The optimal path stays near the leading diagonal, so reduction
        // must not change the score.
        let q = b"ACTCTATTTTACTCAGTGCAGGGTGAGCCGCCTATGCGGAGTGCAGTTACATAGGGAAAGCGGGGCTCAATTGCTACTCGTATGGGGTGTCACAGACGC";
        let t = b"ACTCTATTTTACTCAGTGCAGGGTGAGCCGCCTATGCGGAGTGCAGTTACATAGGGTAAAGCGGGGCTCAATTGCTACTCGTATGGGGTGTCACAGACGC";
        let exact = global().align(q, t).unwrap();
        let mut adaptive = global();
        adaptive.set_adaptive(10, 50, 1).unwrap();
        let reduced = adaptive.align(q, t).unwrap();
        assert_eq!(exact.score, reduced.score);
        assert!(reduced.score >= exact.score);
    }

    #[test]
    fn test_longer_query_than_target() {
        let res = global().align(b"ACGTACGT", b"ACGT").unwrap();
        assert_eq!(res.score, score_from_ops(&res.ops, &Penalties::default()));
        let (used_q, used_t) = consumed(&res.ops);
        assert_eq!(used_q, 8);
        assert_eq!(used_t, 4);
    }

    #[test]
    fn test_reuse_across_pairs() {
        let mut aligner = global();
        let first = aligner.align(b"GATACA", b"GAGATA").unwrap();
        let again = aligner.align(b"GATACA", b"GAGATA").unwrap();
        assert_eq!(first, again);
        let other = aligner.align(b"ACCATACTCG", b"AGGATGCTCG").unwrap();
        assert_eq!(other.score, 12);
    }
}
