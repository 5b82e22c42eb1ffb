//! Stats command handler

use anyhow::{Context, Result};
use spritesheet::stats::{self, Stats};
use spritesheet::Export;
use std::fmt::Write;
use std::path::Path;

pub fn handle(input: &Path, json: bool) -> Result<()> {
    let doc = Export::read_json(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let summary = stats::summarize(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_table(&summary));
    }

    Ok(())
}

/// Fixed-width table, one row per atlas id
fn render_table(summary: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>8}  {:>6}  {:>7}  {:>6}", "atlas", "sheets", "sprites", "frames");
    for (atlas_id, s) in &summary.atlases {
        let _ = writeln!(
            out,
            "{:>8}  {:>6}  {:>7}  {:>6}",
            atlas_id, s.sheets, s.sprites, s.frames
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Animated sprites: {}", summary.animated_sprites);
    out
}
