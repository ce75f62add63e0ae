//! CLI frontend for the Eternum engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "eternum",
    about = "Eternum: an entity-component engine with a fixed-timestep console runtime",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the default systems and run the main loop
    Run {
        /// RNG seed for map generation (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop after this many frames
        #[arg(short, long)]
        frames: Option<u64>,

        /// Fixed update step in seconds
        #[arg(long)]
        fixed_step: Option<f64>,

        /// Frame rate cap
        #[arg(long)]
        fps: Option<u32>,

        /// Run without a terminal: keys come from --keys, time is simulated
        #[arg(long)]
        headless: bool,

        /// Keys to feed in headless mode, one per frame (e.g. g m q)
        #[arg(short, long, num_args = 1..)]
        keys: Vec<String>,

        /// JSON runtime configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a single map and print it
    Dungeon {
        /// Map width in cells
        #[arg(long, default_value = "40")]
        width: i32,

        /// Map height in cells
        #[arg(long, default_value = "20")]
        height: i32,

        /// RNG seed for deterministic generation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Generate a cave instead of rooms and corridors
        #[arg(long)]
        cave: bool,

        /// Cave smoothing passes
        #[arg(long, default_value = "4")]
        smooth: usize,
    },

    /// List the default systems in dispatch order
    Systems,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            seed,
            frames,
            fixed_step,
            fps,
            headless,
            keys,
            config,
        } => commands::run::run(&commands::run::RunOptions {
            seed,
            frames,
            fixed_step,
            fps,
            headless,
            keys,
            config,
        }),
        Commands::Dungeon {
            width,
            height,
            seed,
            cave,
            smooth,
        } => commands::dungeon::run(width, height, seed, cave, smooth),
        Commands::Systems => commands::systems::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
