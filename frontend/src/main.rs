use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use beamline_machines::rom_loader::RomSet;
use beamline_machines::vectrex::{BIOS_FILE, CART_FILE, Vectrex};
use clap::Parser;

mod config;
mod rom_path;
mod runner;

use config::{Config, OutputFormat};
use runner::RunOptions;

/// Headless runner for the vector console core.
#[derive(Parser, Debug)]
#[command(name = "beamline", version)]
struct Args {
    /// Cartridge image (plain file or .zip)
    cart: PathBuf,

    /// Configuration file (default: <config dir>/beamline/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// System ROM image (plain file or .zip)
    #[arg(long)]
    bios: Option<PathBuf>,

    /// Display frames to run
    #[arg(long)]
    frames: Option<u32>,

    /// Breakpoint address (0x1234, $1234 or decimal); repeatable
    #[arg(long = "break", value_name = "ADDR", value_parser = parse_break)]
    breakpoints: Vec<u16>,

    /// Instructions a step request may run before free-running
    #[arg(long)]
    step_ceiling: Option<u64>,

    /// Emit JSON lines instead of a text summary
    #[arg(long)]
    json: bool,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn parse_break(text: &str) -> Result<u16, String> {
    config::parse_address(text).map_err(|e| e.to_string())
}

/// Command line over config file over built-in defaults.
fn merge(args: &Args, config: &Config) -> Result<(Option<PathBuf>, RunOptions), Box<dyn Error>> {
    let defaults = RunOptions::default();
    let mut breakpoints = config.breakpoint_addresses()?;
    breakpoints.extend(&args.breakpoints);

    let output = if args.json {
        OutputFormat::Json
    } else {
        config.output.unwrap_or(defaults.output)
    };

    let opts = RunOptions {
        frames: args.frames.or(config.frames).unwrap_or(defaults.frames),
        breakpoints,
        step_ceiling: args.step_ceiling.or(config.step_ceiling),
        output,
    };
    let bios = args.bios.clone().or_else(|| config.bios.clone());
    Ok((bios, opts))
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = Config::resolve(args.config.as_deref())?;
    let (bios, opts) = merge(args, &config)?;
    let bios = bios.ok_or("no system ROM: pass --bios or set `bios` in the config file")?;

    let mut roms = RomSet::default();
    roms.insert(BIOS_FILE, rom_path::load_image(&bios)?);
    roms.insert(CART_FILE, rom_path::load_image(&args.cart)?);
    let mut sys = Vectrex::from_rom_set(&roms)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = runner::run(&mut sys, &opts, &mut out)?;
    out.flush()?;
    log::info!(
        "ran {} frames, {} cycles, {} pause events",
        opts.frames,
        report.cycles,
        report.events
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("beamline: {e}");
            ExitCode::FAILURE
        }
    }
}
