mod app;
mod cli;
mod config;
mod http;
mod logging;
mod movies;
mod paths;
mod store;

#[cfg(test)]
mod test_server;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    if let Err(err) = logging::init() {
        eprintln!("warning: logging disabled: {err:#}");
    }
    app::run(cli)
}
