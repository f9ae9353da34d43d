//! General types shared by the aligner, the reference implementation, and
//! the binaries.

use crate::offset::MAX_SEQ_LEN;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// The wavefront variants selectable from the command line.
#[derive(Clone, Copy, Debug, EnumString, Display)]
pub enum AlignmentAlgorithm {
    /// Exact wavefront alignment.
    Wavefront,

    /// Wavefront alignment with adaptive wavefront reduction.
    WavefrontAdaptive,
}

/// Whether an alignment must span both sequences end to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display)]
pub enum AlignMode {
    /// Start at (0, 0), end at (n, m).
    Global,

    /// Free gaps before and after the aligned region: the alignment may
    /// start anywhere on the first row or column and end anywhere on the
    /// last row or column.
    SemiGlobal,
}

/// Penalty scores.
/// There is no match penalty: matches do not change the score.
/// The penalty for a gap of length l is open_pen + l * extd_pen; the
/// extension penalty is also applied when a gap is opened.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Penalties {
    /// There is a single mismatch penalty for every byte combination.
    pub mismatch_pen: u32,

    /// Gap opening penalty.
    pub open_pen: u32,

    /// Gap extension penalty. It is also applied when a gap is opened.
    pub extd_pen: u32,
}

impl Default for Penalties {
    fn default() -> Penalties {
        Penalties {
            mismatch_pen: 4,
            open_pen: 6,
            extd_pen: 2,
        }
    }
}

/// Settings for adaptive wavefront reduction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AdaptiveParams {
    /// Reduction only runs on wavefronts at least this wide.
    pub min_wf_len: usize,

    /// Diagonals whose remaining-distance estimate trails the best one by
    /// more than this are pruned.
    pub max_dist_diff: u32,

    /// Reduction runs every this many scores.
    pub cutoff_step: u32,
}

impl Default for AdaptiveParams {
    fn default() -> AdaptiveParams {
        AdaptiveParams {
            min_wf_len: 10,
            max_dist_diff: 50,
            cutoff_step: 1,
        }
    }
}

/// Error type, for alignment errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignmentError {
    /// Both sequences need at least one byte.
    #[error("empty sequence: query length {query}, target length {target}")]
    EmptySequence { query: usize, target: usize },

    /// Offsets carry their provenance tag in the low bits, which caps the
    /// addressable sequence length.
    #[error("sequence too long: length {len} exceeds the maximum of {max}", max = MAX_SEQ_LEN)]
    SequenceTooLong { len: usize },

    /// min_wf_len = 0 would prune every wavefront down to nothing.
    #[error("invalid adaptive parameters: min_wf_len must be > 0")]
    InvalidAdaptiveParams,
}
