//! Settings command.

use crate::config;
use anyhow::{anyhow, Result};
use oboeru_core::Settings;
use std::path::Path;

/// Print the effective settings, applying and saving `KEY=VALUE` updates first.
pub fn run(path: &Path, mut settings: Settings, updates: &[String]) -> Result<()> {
    if !updates.is_empty() {
        for update in updates {
            let (key, value) = update
                .split_once('=')
                .ok_or_else(|| anyhow!("expected KEY=VALUE, got {update}"))?;
            settings.set(key.trim(), value)?;
        }
        config::save(path, &settings)?;
        println!("Saved {}", path.display());
    }

    println!("request_retention = {}", settings.request_retention);
    println!("maximum_interval  = {}", settings.maximum_interval);
    println!("daily_limit       = {}", settings.daily_limit);
    Ok(())
}
