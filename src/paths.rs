use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn log_file_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("unable to resolve local data directory")?;
    Ok(base.join("moviedeck").join("moviedeck.log"))
}
