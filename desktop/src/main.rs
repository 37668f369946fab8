use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

mod app;
mod config;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ./ninesweep.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding sounds, textures and the font
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .init();
    log::debug!("{:?}", cli);

    let mut config = AppConfig::load_or_default(cli.config.as_deref()).context("could not load config")?;
    if let Some(assets) = cli.assets {
        config.asset_dir = assets;
    }
    log::debug!("seed: {:?}", cli.seed);

    app::run(config, cli.seed)
}
