//! Pack command handler

use anyhow::{bail, Context, Result};
use spritesheet::{build_spritesheet, PackOptions};
use std::path::Path;

pub fn handle(input: &Path, out_dir: &Path, opts: &PackOptions) -> Result<()> {
    if !input.is_dir() {
        bail!("Input directory not found: {}", input.display());
    }

    println!("Scanning input: {}", input.display());
    println!("Output directory: {}", out_dir.display());
    println!(
        "Max sheet size: {0}x{0} | Padding: {1}",
        opts.max_size, opts.padding
    );

    let atlas = build_spritesheet(input, out_dir, opts)
        .with_context(|| format!("Failed to pack {}", input.display()))?;

    for sheet in &atlas.meta.sheets {
        println!("Wrote sheet: {} ({}x{})", sheet.file, sheet.w, sheet.h);
    }
    println!(
        "Wrote atlas JSON: {} ({} sprites)",
        out_dir.join(format!("{}.json", opts.basename)).display(),
        atlas.sprites.len()
    );

    Ok(())
}
