use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use batchnn::{report, Dataset, Network, Result, RunConfig};

#[derive(Parser)]
#[command(
    name = "batchnn",
    about = "Train a dense sigmoid network on an IDX image dataset"
)]
struct Args {
    /// Path to the JSON run configuration.
    config: PathBuf,

    /// Override the seed from the configuration file.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let cfg = RunConfig::from_file(&args.config)?;

    let train = Dataset::from_idx_files(&cfg.train_images, &cfg.train_labels)?;
    let test = Dataset::from_idx_files(&cfg.test_images, &cfg.test_labels)?;
    info!(
        "loaded {} training and {} test samples ({} features)",
        train.len(),
        test.len(),
        train.input_dim()
    );

    let mut rng = match args.seed.or(cfg.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut net = Network::new_with_rng(&cfg.layer_sizes, &mut rng)?;

    let fit = net.fit_with_rng(&train, &test, &cfg.fit_config(), &mut rng)?;
    info!("best accuracy {}/{}", fit.best_correct, fit.test_len);

    report::append_text(&cfg.report_file, &cfg, &fit)?;
    if let Some(path) = &cfg.report_json {
        report::append_json(path, &cfg, &fit)?;
    }
    Ok(())
}
