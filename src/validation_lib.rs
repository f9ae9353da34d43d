//! Randomized cross-validation of the wavefront engine against the DP
//! reference: generate a target, mutate it into a query, align with both,
//! compare scores.

use crate::aligner::Aligner;
use crate::alignment_lib::{AlignMode, AlignmentAlgorithm, Penalties};
use crate::reference::affine_gap_score;
use rand::distributions::{Distribution, Standard};
use rand::{thread_rng, Rng};

const ALPHABET: &[u8] = b"ACGT";

enum MutationType {
    Insertion,
    Deletion,
    Substitution,
}

impl Distribution<MutationType> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MutationType {
        match rng.gen_range(0..=2) {
            0 => MutationType::Insertion,
            1 => MutationType::Deletion,
            _ => MutationType::Substitution,
        }
    }
}

fn random_base() -> u8 {
    let mut rng = thread_rng();
    ALPHABET[rng.gen_range(0..ALPHABET.len())]
}

fn random_base_different(b: u8) -> u8 {
    loop {
        let c = random_base();
        if c != b {
            return c;
        }
    }
}

pub fn random_sequence(min_length: usize, max_length: usize) -> Vec<u8> {
    let mut rng = thread_rng();
    let length = rng.gen_range(min_length..max_length);
    (0..length).map(|_| random_base()).collect()
}

/// Apply a random number of random edits, between min_error and max_error
/// percent of the sequence length.
pub fn mutate(seq: &[u8], min_error: u32, max_error: u32) -> Vec<u8> {
    let mut rng = thread_rng();
    let mut mutated: Vec<u8> = seq.to_vec();
    let error_rate = rng.gen_range(min_error..max_error);
    let edits = (error_rate as usize * mutated.len()) / 100;

    for _ in 0..edits {
        if mutated.is_empty() {
            break;
        }
        let position = rng.gen_range(0..mutated.len());
        match rand::random() {
            MutationType::Insertion => mutated.insert(position, random_base()),
            MutationType::Deletion => {
                mutated.remove(position);
            }
            MutationType::Substitution => {
                mutated[position] = random_base_different(mutated[position])
            }
        }
    }
    if mutated.is_empty() {
        mutated.push(random_base());
    }
    mutated
}

pub enum ValidationResult {
    Passed,
    Failed(ScoreMismatch),
}

#[derive(Debug)]
pub struct ScoreMismatch {
    pub query: Vec<u8>,
    pub target: Vec<u8>,
    pub wavefront_score: u32,
    pub reference_score: u32,
    pub pens: Penalties,
}

/// The DP score under the wavefront engine's model: the first query and
/// target bytes are always aligned to each other (the seed cell consumes
/// them), and everything after that is ordinary gap-affine alignment.
pub fn anchored_reference_score(query: &[u8], target: &[u8], pens: &Penalties) -> u32 {
    let sub = if query[0] == target[0] {
        0
    } else {
        pens.mismatch_pen
    };
    let rest = match (query.len(), target.len()) {
        (1, 1) => 0,
        (1, m) => pens.open_pen + pens.extd_pen * (m as u32 - 1),
        (n, 1) => pens.open_pen + pens.extd_pen * (n as u32 - 1),
        _ => affine_gap_score(&query[1..], &target[1..], pens)
            .expect("suffixes are non-empty"),
    };
    sub + rest
}

/// Run one randomized validation cycle. The exact variant must reproduce
/// the reference score; the adaptive variant may land above it but never
/// below.
pub fn compare_alignment(
    algorithm: AlignmentAlgorithm,
    min_length: usize,
    max_length: usize,
    min_error: u32,
    max_error: u32,
) -> ValidationResult {
    let target = random_sequence(min_length, max_length);
    let query = mutate(&target, min_error, max_error);

    let mut rng = thread_rng();
    let pens = Penalties {
        mismatch_pen: rng.gen_range(1..100),
        open_pen: rng.gen_range(1..100),
        extd_pen: rng.gen_range(1..100),
    };

    let mut aligner = Aligner::new(pens.clone(), AlignMode::Global);
    let adaptive = matches!(algorithm, AlignmentAlgorithm::WavefrontAdaptive);
    if adaptive {
        aligner
            .set_adaptive(10, 50, 1)
            .expect("default adaptive parameters are valid");
    }

    let wavefront = aligner
        .align(&query, &target)
        .expect("validation sequences are non-empty");
    let reference = anchored_reference_score(&query, &target, &pens);

    let agree = if adaptive {
        wavefront.score >= reference
    } else {
        wavefront.score == reference
    };
    if agree {
        ValidationResult::Passed
    } else {
        ValidationResult::Failed(ScoreMismatch {
            query,
            target,
            wavefront_score: wavefront.score,
            reference_score: reference,
            pens,
        })
    }
}
