//! Gap-affine pairwise sequence alignment with the wavefront algorithm.
//!
//! The entry point is [`aligner::Aligner`]: configure penalties and a mode,
//! optionally turn on adaptive wavefront reduction, then call `align` with
//! two byte sequences. [`reference`] holds a plain DP implementation of the
//! same scoring model, used by the `validate` binary to cross-check scores
//! on randomized inputs.

pub mod aligner;
pub mod alignment_lib;
pub mod offset;
pub mod reference;
pub mod result;
pub mod validation_lib;
pub(crate) mod wavefront;
