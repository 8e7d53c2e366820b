use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn realize_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".realize"))
}

pub fn ensure_realize_home() -> Result<PathBuf> {
    let dir = realize_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(realize_home()?.join("config.toml"))
}
