//! Export command handler

use anyhow::{Context, Result};
use spritesheet::{export, AtlasFile, Requirements, SpriteSize};
use std::path::Path;

/// Decode `input`, filter by `requirements`, and write the export to `output`
pub fn handle(
    input: &Path,
    requirements: &Path,
    output: &Path,
    sprite_size: Option<SpriteSize>,
) -> Result<()> {
    let atlas = AtlasFile::open(input)
        .with_context(|| format!("Failed to read atlas {}", input.display()))?;
    let root = atlas.root()?;

    let requirements = Requirements::load(requirements)?;
    let doc = export::build(&root, &requirements, sprite_size)
        .map_err(|e| atlas.format_error(e))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    doc.write_json(output)?;

    println!(
        "Exported {} sheets ({} frames) and {} animated sprites to {}",
        doc.spritesheets.len(),
        doc.frame_count(),
        doc.animated_sprites.len(),
        output.display()
    );
    if !requirements.is_filtering() {
        println!("No sheet filter applied");
    }

    Ok(())
}
