//! Solve utility: reads an MPS source, solves it with the PDHG engine
//! and prints termination status, iteration count and objective.

use firstlp::driver;
use firstlp::solver::PdhgSettings;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: lp-solve <input.mps> [settings.json]");
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1]), args.get(2).map(Path::new)) {
        eprintln!("error: {}", e);
        process::exit(2);
    }
}

fn run(input: &Path, settings_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match settings_path {
        Some(path) => load_settings(path)?,
        None => PdhgSettings::default(),
    };

    let report = driver::run_default(input, &settings)?;

    println!("termination = {}", report.result.status);
    println!("iterations  = {}", report.result.iterations);
    println!("objective   = {:.12e}", report.objective);
    Ok(())
}

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        fn load_settings(path: &Path) -> Result<PdhgSettings<f64>, Box<dyn std::error::Error>> {
            let mut file = std::fs::File::open(path)?;
            Ok(PdhgSettings::read_from_file(&mut file)?)
        }
    } else {
        fn load_settings(_path: &Path) -> Result<PdhgSettings<f64>, Box<dyn std::error::Error>> {
            Err("settings files require a build with the \"serde\" feature".into())
        }
    }
}
