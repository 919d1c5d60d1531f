mod auth;
mod cascade;
mod cli;
mod config;
mod error;
mod model;
mod output;
mod providers;
mod rows;
mod tui;

use std::fs::{self, File, OpenOptions};

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.is_interactive());

    if !cli.is_interactive() {
        output::print_banner();
    }

    info!("Starting cimon {}", env!("CARGO_PKG_VERSION"));
    cli.execute().await?;

    Ok(())
}

/// Interactive commands log to `<cache dir>/cimon/cimon.log` so log lines
/// never land on the alternate screen; everything else logs to stderr.
fn init_logging(interactive: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if interactive {
        match log_file() {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join("cimon");
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("cimon.log"))
        .ok()
}
