use clap::Parser;
use lib::aligner::Aligner;
use lib::alignment_lib::{AlignMode, Penalties};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::exit;

/// Struct used for parsing CLI args with clap.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// Query sequence (together with TARGET; or use --input).
    query: Option<String>,

    /// Target sequence.
    target: Option<String>,

    /// File of alternating ">query" / "<target" lines.
    #[clap(short, long)]
    input: Option<PathBuf>,

    #[clap(short, long, default_value_t = 4)]
    mismatch_pen: u32,
    #[clap(short, long, default_value_t = 6)]
    open_pen: u32,
    #[clap(short, long, default_value_t = 2)]
    extd_pen: u32,

    /// Disable adaptive wavefront reduction (exact alignment).
    #[clap(long)]
    no_adaptive: bool,

    /// Free gaps before and after the aligned region.
    #[clap(long)]
    semi_global: bool,

    /// Print scores and CIGARs only, for benchmarking.
    #[clap(long)]
    score_only: bool,
}

fn main() {
    env_logger::init();
    let args = MainArgs::parse();

    let pens = Penalties {
        mismatch_pen: args.mismatch_pen,
        open_pen: args.open_pen,
        extd_pen: args.extd_pen,
    };
    let mode = if args.semi_global {
        AlignMode::SemiGlobal
    } else {
        AlignMode::Global
    };
    let mut aligner = Aligner::new(pens, mode);
    if !args.no_adaptive {
        aligner
            .set_adaptive(10, 50, 1)
            .expect("default adaptive parameters are valid");
    }

    let pairs = match (&args.input, &args.query, &args.target) {
        (Some(path), _, _) => match read_pairs(path) {
            Ok(pairs) => pairs,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                exit(1);
            }
        },
        (None, Some(query), Some(target)) => {
            vec![(query.clone().into_bytes(), target.clone().into_bytes())]
        }
        _ => {
            eprintln!("expected two sequences, or --input FILE");
            exit(1);
        }
    };

    for (query, target) in &pairs {
        match aligner.align(query, target) {
            Ok(res) => {
                println!("{}\t{}", res.score, res.cigar());
                if !args.score_only {
                    let (q_row, mid, t_row) = res.aligned_rows(query, target);
                    println!("{q_row}\n{mid}\n{t_row}");
                }
            }
            Err(e) => {
                eprintln!("alignment failed: {e}");
                exit(1);
            }
        }
    }
}

/// Parse a file of ">query" / "<target" line pairs.
fn read_pairs(path: &Path) -> io::Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut pairs = Vec::new();
    let mut pending: Option<Vec<u8>> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('>') {
            if pending.is_some() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "query line without a following target",
                ));
            }
            pending = Some(rest.trim().as_bytes().to_vec());
        } else if let Some(rest) = line.strip_prefix('<') {
            match pending.take() {
                Some(query) => pairs.push((query, rest.trim().as_bytes().to_vec())),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "target line without a preceding query",
                    ))
                }
            }
        } else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("lines must start with '>' or '<', got: {line}"),
            ));
        }
    }
    if pending.is_some() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "query line without a following target",
        ));
    }
    if pairs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "no sequence pairs in input",
        ));
    }
    Ok(pairs)
}
