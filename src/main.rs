use std::path::PathBuf;

use clap::Parser;

mod run;

/// Turns a free-form effect description into a directory of fluid field
/// snapshots for downstream visualization.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Effect description, e.g. "swirling vortex, red".
    effect: String,

    /// Inline JSON mapping of explicit simulation parameter overrides.
    #[arg(long)]
    params: Option<String>,

    /// Path to a JSON file with explicit simulation parameter overrides.
    /// Inline `--params` values win over the file.
    #[arg(long)]
    params_file: Option<PathBuf>,

    /// Directory into which snapshot records are written.
    #[arg(long, default_value = "output/fluid_data")]
    output: PathBuf,

    /// Steps between snapshots.
    #[arg(long, default_value_t = 10)]
    snapshot_interval: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    run::run(&args)
}
