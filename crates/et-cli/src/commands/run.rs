use std::io;
use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use et_console::{Key, KeySource, ScriptedKeys, TerminalKeys, register_default_systems};
use et_runtime::{RunReport, Runtime, RuntimeConfig, SteppedClock};

/// Frame limit for headless runs that set none.
const HEADLESS_FRAMES: u64 = 60;
/// Frame rate cap for interactive runs that set none.
const INTERACTIVE_FPS: u32 = 60;

pub struct RunOptions {
    pub seed: Option<u64>,
    pub frames: Option<u64>,
    pub fixed_step: Option<f64>,
    pub fps: Option<u32>,
    pub headless: bool,
    pub keys: Vec<String>,
    pub config: Option<PathBuf>,
}

pub fn run(opts: &RunOptions) -> Result<(), String> {
    if !opts.headless && !opts.keys.is_empty() {
        return Err("--keys only applies to --headless runs".into());
    }
    let config = build_config(opts)?;

    let report = if opts.headless {
        let keys = parse_keys(&opts.keys)?;
        let clock_step = config.fixed_delta;
        let mut runtime = start(config, Box::new(ScriptedKeys::one_per_frame(keys)))?;
        runtime
            .run_with_clock(&mut SteppedClock::new(clock_step))
            .map_err(|e| e.to_string())?
    } else {
        let keys = TerminalKeys::new().map_err(|e| e.to_string())?;
        // dropping the runtime releases raw mode before the summary prints
        let mut runtime = start(config, Box::new(keys))?;
        runtime.run().map_err(|e| e.to_string())?
    };

    print_report(&report);
    Ok(())
}

fn build_config(opts: &RunOptions) -> Result<RuntimeConfig, String> {
    let mut config = match &opts.config {
        Some(path) => RuntimeConfig::load(path)
            .map_err(|e| format!("cannot load {}: {e}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    if let Some(seed) = opts.seed {
        config = config.with_seed(seed);
    }
    if let Some(frames) = opts.frames {
        config = config.with_max_frames(frames);
    }
    if let Some(step) = opts.fixed_step {
        config = config.with_fixed_delta(step);
        // a frame must be allowed to cover at least one step
        if config.max_frame_delta < step {
            config = config.with_max_frame_delta(step);
        }
    }
    if let Some(fps) = opts.fps {
        config = config.with_target_fps(fps);
    }

    if opts.headless && config.max_frames.is_none() {
        config = config.with_max_frames(HEADLESS_FRAMES);
    }
    if !opts.headless && config.target_fps.is_none() {
        config = config.with_target_fps(INTERACTIVE_FPS);
    }
    Ok(config)
}

fn parse_keys(names: &[String]) -> Result<Vec<Key>, String> {
    names
        .iter()
        .map(|name| name.parse::<Key>().map_err(|e| e.to_string()))
        .collect()
}

fn start(config: RuntimeConfig, keys: Box<dyn KeySource>) -> Result<Runtime, String> {
    let seed = config.seed;
    let mut runtime = Runtime::new(config).map_err(|e| e.to_string())?;
    register_default_systems(runtime.registry_mut(), seed, keys, Box::new(io::stdout()));
    Ok(runtime)
}

fn print_report(report: &RunReport) {
    println!();
    println!(
        "  {} {} frames, {} fixed updates {}",
        "Finished".bold(),
        report.frames,
        report.fixed_updates,
        format!("({:.3}s simulated)", report.elapsed).dimmed()
    );

    if report.faults.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Frame", "System", "Phase", "Error"]);
    for fault in &report.faults {
        table.add_row(vec![
            fault.frame.to_string(),
            fault.system.clone(),
            fault.phase.to_string(),
            fault.message.clone(),
        ]);
    }
    println!();
    println!("  {}", format!("{} faults", report.faults.len()).red().bold());
    println!("{table}");
}
