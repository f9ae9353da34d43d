use clap::Parser;
use lib::alignment_lib::AlignmentAlgorithm;
use lib::validation_lib::{compare_alignment, ValidationResult};

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Struct used for parsing CLI args with clap.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct ValidateArgs {
    /// Which wavefront variant to check against the DP reference.
    #[clap(short, long, default_value = "Wavefront")]
    algorithm: AlignmentAlgorithm,

    /// One validation worker per CPU instead of a single loop.
    #[clap(short, long)]
    parallel: bool,

    #[clap(long, default_value_t = 2)]
    min_length: usize,

    #[clap(long, default_value_t = 100)]
    max_length: usize,

    #[clap(long, default_value_t = 0)]
    min_error: u32,

    #[clap(long, default_value_t = 50)]
    max_error: u32,
}

fn validate(args: ValidateArgs) {
    for cycle in 0..u64::MAX {
        match compare_alignment(
            args.algorithm,
            args.min_length,
            args.max_length,
            args.min_error,
            args.max_error,
        ) {
            ValidationResult::Passed => println!("Validation successful at cycle {cycle}"),
            ValidationResult::Failed(mismatch) => {
                println!("Validation failed at cycle {cycle}.\n{mismatch:?}");
                return;
            }
        }
    }
}

fn validate_concurrent(args: ValidateArgs) {
    let num_threads = num_cpus::get();
    let (tx, rx): (Sender<ValidationResult>, Receiver<ValidationResult>) = mpsc::channel();
    let mut threads = Vec::new();

    for _ in 0..num_threads {
        let new_tx = tx.clone();
        threads.push(thread::spawn(move || loop {
            let result = compare_alignment(
                args.algorithm,
                args.min_length,
                args.max_length,
                args.min_error,
                args.max_error,
            );
            if new_tx.send(result).is_err() {
                break;
            }
        }));
    }

    for cycle in 0..u64::MAX {
        match rx.recv() {
            Ok(ValidationResult::Passed) => println!("Validation successful at cycle {cycle}"),
            Ok(ValidationResult::Failed(mismatch)) => {
                println!("Validation failed at cycle {cycle}.\n{mismatch:?}");
                return;
            }
            Err(_) => return,
        }
    }
}

fn main() {
    env_logger::init();
    let args = ValidateArgs::parse();

    if args.parallel {
        validate_concurrent(args);
    } else {
        validate(args);
    }
}
