use std::fs::File;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde_json::{Map, Value};

use stokes_fluids::Simulation;
use stokes_io::SnapshotEncoder;
use stokes_params::SimulationConfig;

use crate::Args;

pub fn run(args: &Args) -> Result<()> {
    let overrides = load_overrides(args)?;

    let effect = args.effect.to_lowercase();
    let resolved = stokes_params::infer([effect.as_str()]);

    let merged = stokes_params::merge(&resolved.sim, &overrides);
    let (config, corrections) = stokes_params::validate(&merged);
    for correction in &corrections {
        warn!("parameter corrected: {correction}");
    }

    info!(
        "running {:?} on a {}x{} grid for {} steps",
        config.initial_shape_type,
        config.nx(),
        config.ny(),
        config.time_steps,
    );

    let encoder = SnapshotEncoder::create(&args.output, config.time_steps)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;
    encoder.encode_metadata(
        [config.nx(), config.ny()],
        config.time_steps,
        args.snapshot_interval,
        [SimulationConfig::DOMAIN_SIZE; 2],
    )?;

    // Visualization parameters are consumer metadata; explicit overrides win
    // over inference, and the result lands next to the records.
    let viz = stokes_params::merge_viz(&resolved.viz, &overrides);
    let viz_path = args.output.join("viz_params.json");
    serde_json::to_writer_pretty(File::create(&viz_path)?, &viz)?;

    let bar_template =
        "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template)
        .expect("valid progress template")
        .progress_chars("=> ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(config.time_steps as u64).with_style(style);

    let mut written = 0usize;
    for event in Simulation::new(config).snapshots_every(args.snapshot_interval) {
        let snapshot = event.context("simulation aborted")?;
        progress.set_position(snapshot.step as u64);

        encoder
            .encode_snapshot(&snapshot)
            .with_context(|| format!("writing snapshot for step {}", snapshot.step))?;
        written += 1;
    }

    progress.finish();
    info!(
        "wrote {written} snapshots to {}",
        encoder.path().display()
    );

    Ok(())
}

fn load_overrides(args: &Args) -> Result<Map<String, Value>> {
    let mut overrides = Map::new();

    if let Some(path) = &args.params_file {
        let file = File::open(path)
            .with_context(|| format!("opening parameter file {}", path.display()))?;
        let map: Map<String, Value> =
            serde_json::from_reader(file).context("parameter file is not a JSON mapping")?;
        overrides.extend(map);
    }

    if let Some(inline) = &args.params {
        let map: Map<String, Value> =
            serde_json::from_str(inline).context("--params is not a JSON mapping")?;
        overrides.extend(map);
    }

    Ok(overrides)
}
