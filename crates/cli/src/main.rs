//! RV32IM cycle-accurate simulator CLI.
//!
//! This binary loads a program image, runs the core until `EBREAK` (or the
//! cycle budget), and reports statistics. It performs:
//! 1. **Run:** Execute a hex or flat-binary image with UART output echoed.
//! 2. **Configuration:** Defaults, optionally overridden by a JSON file.
//! 3. **Reporting:** Human-readable or JSON statistics, optional register dump.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rv32sim_core::sim::loader;
use rv32sim_core::{Config, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "rv32sim",
    author,
    version,
    about = "Cycle-accurate RV32IM pipeline simulator",
    long_about = "Run a bare-metal RV32IM image on a cycle-accurate 5-stage pipeline model.\n\nImages ending in .hex/.txt are parsed as one hex word per line; anything else\nis loaded as a flat little-endian binary. The program signals completion with\nEBREAK.\n\nExamples:\n  rv32sim program.hex\n  rv32sim program.bin --cycles 1000000 --stats-json\n  RUST_LOG=rv32sim_core=trace rv32sim program.hex"
)]
struct Cli {
    /// Program image (.hex/.txt as hex text, otherwise flat binary).
    image: PathBuf,

    /// Cycle budget; the run fails if EBREAK is not reached in time.
    #[arg(long, default_value_t = 10_000_000)]
    cycles: u64,

    /// JSON configuration file overriding the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit statistics as JSON on stdout instead of the text report.
    #[arg(long)]
    stats_json: bool,

    /// Dump the register file after the run.
    #[arg(long)]
    dump_regs: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    let image = match loader::load_image(&cli.image) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let mut sim = Simulator::new(&config);
    sim.cpu.mem.set_uart_echo(true);
    if let Err(e) = sim.load_image(&image) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    match sim.run(cli.cycles) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }

    if cli.dump_regs {
        dump_registers(&sim);
    }

    if cli.stats_json {
        match serde_json::to_string_pretty(&sim.cpu.stats) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize statistics: {e}");
                process::exit(1);
            }
        }
    } else {
        sim.cpu.stats.print();
    }
}

/// Reads and parses a JSON configuration file.
fn load_config(path: &PathBuf) -> Result<Config, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config '{}': {e}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))
}

/// Prints the final register file, four registers per row.
fn dump_registers(sim: &Simulator) {
    let regs = sim.cpu.regs.dump();
    for (i, chunk) in regs.chunks(4).enumerate() {
        let mut row = String::new();
        for (j, value) in chunk.iter().enumerate() {
            row.push_str(&format!("x{:<2} {:#010x}  ", i * 4 + j, value));
        }
        println!("{}", row.trim_end());
    }
}
