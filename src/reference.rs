//! DP matrix based, gap-affine, unoptimized alignment.
//!
//! The classic Gotoh recurrence over three rolling rows. Quadratic and
//! slow, but obviously correct, which makes it the oracle for randomized
//! cross-validation of the wavefront engine.

use crate::alignment_lib::{AlignmentError, Penalties};
use std::cmp::min;

const INF: u32 = u32::MAX / 4;

/// Optimal global gap-affine alignment score of `query` against `target`.
pub fn affine_gap_score(
    query: &[u8],
    target: &[u8],
    pens: &Penalties,
) -> Result<u32, AlignmentError> {
    if query.is_empty() || target.is_empty() {
        return Err(AlignmentError::EmptySequence {
            query: query.len(),
            target: target.len(),
        });
    }

    let n = query.len();
    let m = target.len();
    let x = pens.mismatch_pen;
    let o = pens.open_pen;
    let e = pens.extd_pen;

    // Row-by-row: `del` gaps consume the query, `ins` gaps the target.
    let mut mat = vec![INF; m + 1];
    let mut ins = vec![INF; m + 1];
    let mut del = vec![INF; m + 1];
    mat[0] = 0;
    for j in 1..=m {
        ins[j] = o + e * j as u32;
        mat[j] = ins[j];
    }

    for i in 1..=n {
        let mut prev_diag = mat[0];
        del[0] = o + e * i as u32;
        mat[0] = del[0];
        ins[0] = INF;
        for j in 1..=m {
            let sub = if query[i - 1] == target[j - 1] { 0 } else { x };
            let del_j = min(del[j] + e, mat[j] + o + e);
            let ins_j = min(ins[j - 1] + e, mat[j - 1] + o + e);
            let mat_j = min(prev_diag + sub, min(del_j, ins_j));
            prev_diag = mat[j];
            del[j] = del_j;
            ins[j] = ins_j;
            mat[j] = mat_j;
        }
    }

    Ok(mat[m])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pens(mismatch: u32, open: u32, extd: u32) -> Penalties {
        Penalties {
            mismatch_pen: mismatch,
            open_pen: open,
            extd_pen: extd,
        }
    }

    #[test]
    fn test_identical() {
        assert_eq!(affine_gap_score(b"CAT", b"CAT", &pens(1, 1, 1)), Ok(0));
    }

    #[test]
    fn test_single_trailing_gap() {
        assert_eq!(affine_gap_score(b"CAT", b"CATS", &pens(1, 1, 1)), Ok(2));
    }

    #[test]
    fn test_mismatches_beat_gaps() {
        assert_eq!(affine_gap_score(b"XX", b"YY", &pens(1, 100, 100)), Ok(2));
    }

    #[test]
    fn test_gaps_beat_mismatches() {
        // Two gaps of length two: 2 * (1 + 2 * 1).
        assert_eq!(affine_gap_score(b"XX", b"YY", &pens(100, 1, 1)), Ok(6));
        assert_eq!(affine_gap_score(b"XX", b"YYYYYYYY", &pens(100, 1, 1)), Ok(12));
        assert_eq!(affine_gap_score(b"XXZZ", b"XXYZ", &pens(100, 1, 1)), Ok(4));
    }

    #[test]
    fn test_longer_sequences() {
        let q = b"TCTTTACTCGCGCGTTGGAGAAATACAATAGT";
        let t = b"TCTATACTGCGCGTTTGGAGAAATAAAATAGT";
        assert_eq!(affine_gap_score(q, t, &pens(1, 1, 1)), Ok(6));
        assert_eq!(affine_gap_score(q, t, &pens(135, 82, 19)), Ok(472));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            affine_gap_score(b"", b"A", &pens(1, 1, 1)),
            Err(AlignmentError::EmptySequence { query: 0, target: 1 })
        );
    }
}
