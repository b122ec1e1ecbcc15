//! MIPS32 five-stage pipeline simulator CLI.
//!
//! Loads a TOML configuration and a program image (raw `.text`/`.data`
//! binaries), then ticks the simulated machine until the program issues an
//! exit syscall, printing per-tick line traces when `--trace` is set and a
//! statistics report at the end.

use std::path::PathBuf;
use std::process;

use clap::Parser;

extern crate mips_pipeline_sim;

use mips_pipeline_sim::config::Config;
use mips_pipeline_sim::sim::{ProgramImage, System};

/// Command-line arguments for the pipeline simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "MIPS32 cycle-level pipeline simulator")]
struct Args {
    /// Path to a TOML configuration file; falls back to built-in defaults
    /// if not given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the assembled `.text` section binary.
    #[arg(long)]
    text: PathBuf,

    /// Path to the assembled `.data` section binary, if any.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Print a per-stage line trace on every tick.
    #[arg(long)]
    trace: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to read config '{}': {e}", path.display());
            process::exit(1);
        }),
        None => Config::default(),
    };
    let trace = args.trace || config.general.trace;

    let image = ProgramImage::from_files(
        &args.text,
        args.data.as_deref(),
        config.general.text_base_val(),
        config.general.data_base_val(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Failed to load program image: {e}");
        process::exit(1);
    });

    let mut system = System::new(&config);
    system.load_image(&image);

    let code = loop {
        system.tick();
        if trace {
            println!("{}", system.last_linetrace());
        }
        if let Some(code) = system.exit_status() {
            break code;
        }
    };

    system.print_stats();
    process::exit(code as i32);
}
