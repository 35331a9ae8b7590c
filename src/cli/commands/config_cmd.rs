//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::Context;
use crate::core::config::{Config, GlobalConfig};
use crate::ui::output;

/// Print a configuration value. Unset keys print nothing.
pub fn get(_ctx: &Context, key: &str) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    if let Some(value) = config.global.get_key(key)? {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value and write the config file.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = Config::write_path().context("Failed to locate config file")?;

    let mut global = if path.exists() {
        Config::load_from(&path)
            .context("Failed to load config")?
            .global
    } else {
        GlobalConfig::default()
    };

    global
        .set_key(key, value)
        .with_context(|| format!("Cannot set '{}'", key))?;
    Config::write_to(&path, &global).context("Failed to write config")?;

    log::debug!("wrote {}", path.display());
    output::success(format!("Set {} = {}", key, value), ctx.verbosity);
    Ok(())
}

/// List every configuration key with its value.
pub fn list(_ctx: &Context) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    match config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config file found, showing defaults"),
    }

    for key in GlobalConfig::KEYS {
        match config.global.get_key(key)? {
            Some(value) => println!("{} = {}", key, value),
            None => println!("{} = (not set)", key),
        }
    }
    Ok(())
}
