mod app;
mod cli;
mod config;
mod logging;
mod record;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use config::Config;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init()?;

    let mut config = Config::load_or_default(&args.config);
    if let Some(protocol) = args.protocol {
        config.sync.protocol = protocol;
    }
    config.validate()?;
    info!(
        config = %args.config.display(),
        protocol = %config.sync.protocol,
        platform = std::env::consts::OS,
        "ssvep-present starting"
    );

    match args.command.unwrap_or(Command::Session) {
        Command::Session => app::run_session(&config),
        Command::Record(record_args) => record::record_frames(&config, &record_args),
    }
}
