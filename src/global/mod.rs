use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "granola-export";
const GRANOLA_DIR: &str = "Granola";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Location of the credential cache maintained by the Granola desktop app.
///
/// Resolves to `~/Library/Application Support/Granola/supabase.json` on macOS
/// and `~/.config/Granola/supabase.json` on Linux.
pub fn credential_file() -> Result<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(GRANOLA_DIR).join("supabase.json"));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".config").join(GRANOLA_DIR).join("supabase.json"));
    }
    Err(anyhow!("Unable to determine the Granola application data directory"))
}
