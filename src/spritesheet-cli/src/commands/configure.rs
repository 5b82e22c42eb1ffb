//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting spritesheet CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
///
/// Any path given is stored in the config file; `show` prints the
/// resulting configuration.
pub fn handle(
    mut config: Config,
    sprite_sheet_bin: Option<PathBuf>,
    requirements: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    show: bool,
) -> Result<()> {
    let changed = apply(&mut config, sprite_sheet_bin, requirements, output_dir);

    if changed {
        let path = config.save()?;
        println!("Config saved to: {}", path.display());
    }

    if show {
        show_config(&config);
    } else if !changed {
        show_usage();
    }

    Ok(())
}

/// Merge the given settings into `config`, returning whether anything was set
fn apply(
    config: &mut Config,
    sprite_sheet_bin: Option<PathBuf>,
    requirements: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> bool {
    let mut changed = false;
    for (slot, value) in [
        (&mut config.sprite_sheet_bin, sprite_sheet_bin),
        (&mut config.requirements, requirements),
        (&mut config.output_dir, output_dir),
    ] {
        if value.is_some() {
            *slot = value;
            changed = true;
        }
    }
    changed
}

fn show_setting(label: &str, value: Option<&PathBuf>) {
    match value {
        Some(path) => println!("{}: {}", label, path.display()),
        None => println!("{}: (not set)", label),
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    show_setting("Sprite sheet binary", config.sprite_sheet_bin.as_ref());
    show_setting("Requirements", config.requirements.as_ref());
    show_setting("Output directory", config.output_dir.as_ref());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: spritesheet configure --sprite-sheet-bin PATH");
    println!("   or: spritesheet configure --requirements PATH --output-dir DIR");
    println!("   or: spritesheet configure --show");
    println!();
    println!("Note: spritesheetf.bin is extracted from the game's asset files.");
}
