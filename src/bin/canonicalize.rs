//! Conversion utility: MPS source in, canonical `.npz` archive out.

use firstlp::canonical;
use firstlp::problem::MpsReader;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: lp-canonicalize <input.mps> <output.npz>");
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1]), Path::new(&args[2])) {
        eprintln!("error: {}", e);
        process::exit(2);
    }
}

fn run(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let problem = MpsReader::read_path(input)?;
    canonical::export(&problem, output)?;
    Ok(())
}
