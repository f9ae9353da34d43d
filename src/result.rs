//! Reconstructed alignments: the run-length operation list, the derived
//! statistics, and the text renderings.

use std::fmt::Write;

/// One alignment operation, as emitted by the backtrace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOp {
    /// Matching byte pair.
    Match,
    /// Mismatching byte pair.
    Mismatch,
    /// Byte present in the target but not the query.
    Insert,
    /// Byte present in the query but not the target.
    Delete,
    /// Query byte outside the aligned region (semi-global only).
    Clip,
}

impl AlignOp {
    pub fn letter(self) -> char {
        match self {
            AlignOp::Match => 'M',
            AlignOp::Mismatch => 'X',
            AlignOp::Insert => 'I',
            AlignOp::Delete => 'D',
            AlignOp::Clip => 'H',
        }
    }
}

/// A run of identical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpRun {
    pub op: AlignOp,
    pub len: u32,
}

/// The matched-region coordinates collected during backtrace, 1-based
/// inclusive. All zero when the alignment contains no match at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Region {
    pub q_begin: usize,
    pub q_end: usize,
    pub t_begin: usize,
    pub t_end: usize,
}

/// A finished alignment: score, coalesced operations, coordinates, and the
/// statistics of the region between the first and last match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub score: u32,
    pub ops: Vec<OpRun>,

    /// First and last matched query position, 1-based inclusive.
    pub q_begin: usize,
    pub q_end: usize,
    /// First and last matched target position, 1-based inclusive.
    pub t_begin: usize,
    pub t_end: usize,

    /// Operations between the first and the last match, inclusive.
    pub align_len: u32,
    /// Matching positions within the aligned region.
    pub matches: u32,
    /// Gapped positions (insertions plus deletions) within the aligned region.
    pub gaps: u32,
    /// Maximal runs of gapped positions within the aligned region.
    pub gap_regions: u32,
}

impl AlignmentResult {
    /// Build a result from the backtrace output: operations in reverse
    /// order, one record per consumed position. Reverses, coalesces, and
    /// computes the statistics (in that order: statistics computed on
    /// uncoalesced singletons would double-count runs).
    pub(crate) fn from_backtrace(score: u32, mut rev_ops: Vec<AlignOp>, region: Region) -> AlignmentResult {
        rev_ops.reverse();

        let mut ops: Vec<OpRun> = Vec::new();
        for op in rev_ops {
            match ops.last_mut() {
                Some(run) if run.op == op => run.len += 1,
                _ => ops.push(OpRun { op, len: 1 }),
            }
        }

        let (mut align_len, mut matches, mut gaps, mut gap_regions) = (0, 0, 0, 0);
        let match_runs: Vec<usize> = ops
            .iter()
            .enumerate()
            .filter(|(_, r)| r.op == AlignOp::Match)
            .map(|(i, _)| i)
            .collect();
        if let (Some(&first), Some(&last)) = (match_runs.first(), match_runs.last()) {
            for run in &ops[first..=last] {
                align_len += run.len;
                match run.op {
                    AlignOp::Match => matches += run.len,
                    AlignOp::Insert | AlignOp::Delete => {
                        gaps += run.len;
                        gap_regions += 1;
                    }
                    _ => (),
                }
            }
        }

        AlignmentResult {
            score,
            ops,
            q_begin: region.q_begin,
            q_end: region.q_end,
            t_begin: region.t_begin,
            t_end: region.t_end,
            align_len,
            matches,
            gaps,
            gap_regions,
        }
    }

    /// The run-length encoded operation string, e.g. "3M1X2M".
    pub fn cigar(&self) -> String {
        let mut out = String::new();
        for run in &self.ops {
            let _ = write!(out, "{}{}", run.len, run.op.letter());
        }
        out
    }

    /// Render the alignment as three rows: the query with '-' at
    /// insertions, an indicator row with '|' under matches, and the target
    /// with '-' at deletions. Clipped query bytes are not rendered.
    pub fn aligned_rows(&self, query: &[u8], target: &[u8]) -> (String, String, String) {
        let mut q_row = String::new();
        let mut mid = String::new();
        let mut t_row = String::new();

        let mut qi = 0usize;
        let mut ti = 0usize;
        for run in &self.ops {
            for _ in 0..run.len {
                match run.op {
                    AlignOp::Match => {
                        q_row.push(query[qi] as char);
                        mid.push('|');
                        t_row.push(target[ti] as char);
                        qi += 1;
                        ti += 1;
                    }
                    AlignOp::Mismatch => {
                        q_row.push(query[qi] as char);
                        mid.push(' ');
                        t_row.push(target[ti] as char);
                        qi += 1;
                        ti += 1;
                    }
                    AlignOp::Insert => {
                        q_row.push('-');
                        mid.push(' ');
                        t_row.push(target[ti] as char);
                        ti += 1;
                    }
                    AlignOp::Delete => {
                        q_row.push(query[qi] as char);
                        mid.push(' ');
                        t_row.push('-');
                        qi += 1;
                    }
                    AlignOp::Clip => {
                        qi += 1;
                    }
                }
            }
        }
        (q_row, mid, t_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(s: &str) -> Vec<AlignOp> {
        s.chars()
            .map(|c| match c {
                'M' => AlignOp::Match,
                'X' => AlignOp::Mismatch,
                'I' => AlignOp::Insert,
                'D' => AlignOp::Delete,
                'H' => AlignOp::Clip,
                _ => panic!("bad op {c}"),
            })
            .collect()
    }

    #[test]
    fn test_coalescing_and_cigar() {
        // Backtrace emits in reverse order.
        let rev = ops("MMMMXMMXXM");
        let res = AlignmentResult::from_backtrace(12, rev, Region::default());
        assert_eq!(res.cigar(), "1M2X2M1X4M");
    }

    #[test]
    fn test_statistics_span_between_matches() {
        // Forward: 1M1X3M1I5M2X8M3I1M1X9M (the reverse is fed in).
        let mut rev = ops("MXMMMIMMMMMXXMMMMMMMMIIIMXMMMMMMMMM");
        rev.reverse();
        let res = AlignmentResult::from_backtrace(36, rev, Region::default());
        assert_eq!(res.cigar(), "1M1X3M1I5M2X8M3I1M1X9M");
        assert_eq!(res.align_len, 35);
        assert_eq!(res.matches, 27);
        assert_eq!(res.gaps, 4);
        assert_eq!(res.gap_regions, 2);
        assert!(res.gap_regions <= res.gaps);
    }

    #[test]
    fn test_statistics_ignore_flanks() {
        // Leading clip and insert sit outside the first..last match span.
        let mut rev = ops("HHIMMXMI");
        rev.reverse();
        let res = AlignmentResult::from_backtrace(4, rev, Region::default());
        assert_eq!(res.cigar(), "2H1I2M1X1M1I");
        assert_eq!(res.align_len, 4);
        assert_eq!(res.matches, 3);
        assert_eq!(res.gaps, 0);
        assert_eq!(res.gap_regions, 0);
    }

    #[test]
    fn test_no_match_no_region() {
        let res = AlignmentResult::from_backtrace(4, ops("X"), Region::default());
        assert_eq!(res.cigar(), "1X");
        assert_eq!(res.align_len, 0);
        assert_eq!(res.matches, 0);
    }

    #[test]
    fn test_aligned_rows() {
        // q = "GC" vs t = "AC": 1X1M.
        let mut rev = ops("XM");
        rev.reverse();
        let res = AlignmentResult::from_backtrace(4, rev, Region::default());
        let (q_row, mid, t_row) = res.aligned_rows(b"GC", b"AC");
        assert_eq!(q_row, "GC");
        assert_eq!(mid, " |");
        assert_eq!(t_row, "AC");
    }

    #[test]
    fn test_aligned_rows_with_gaps() {
        // Forward: 1M1I1M1D1M over q = "ACG", t = "AXC"... build explicitly:
        // q: A - C G   t: A X C -
        let mut rev = ops("MIMDM");
        rev.reverse();
        let res = AlignmentResult::from_backtrace(16, rev, Region::default());
        let (q_row, mid, t_row) = res.aligned_rows(b"ACGT", b"AXCT");
        assert_eq!(q_row, "A-CGT");
        assert_eq!(mid, "| | |");
        assert_eq!(t_row, "AXC-T");
    }
}
