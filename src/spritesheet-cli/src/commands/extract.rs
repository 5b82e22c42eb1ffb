//! Extract command handler

use anyhow::{Context, Result};
use spritesheet::{extract::extract_sprites, Export};
use std::path::Path;

pub fn handle(json: &Path, sheet_image: &Path, output: &Path, sheet: Option<&str>) -> Result<()> {
    let doc = Export::read_json(json)
        .with_context(|| format!("Failed to load {}", json.display()))?;

    if let Some(name) = sheet {
        if !doc.spritesheets.iter().any(|s| s.name == name) {
            tracing::warn!(sheet = name, json = %json.display(), "no sheet with this name");
            return Ok(());
        }
    }

    let count = extract_sprites(&doc, sheet_image, output, sheet)?;
    println!("Extracted {} sprites to {}", count, output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use spritesheet::export::{Frame, FrameData, SheetRecord, SpriteGroup};

    fn write_export(dir: &Path) -> std::path::PathBuf {
        let doc = Export {
            spritesheets: vec![SheetRecord {
                name: "equipObjects".into(),
                atlas_id: 2,
                sprites: vec![SpriteGroup {
                    name: "sword".into(),
                    frames: vec![Frame {
                        data: FrameData {
                            position: [0.0, 0.0, 4.0, 4.0],
                            mask_position: [0.0; 4],
                            color: [1.0; 4],
                            transparent: false,
                        },
                        index: 0,
                    }],
                }],
            }],
            animated_sprites: vec![],
        };
        let path = dir.join("spritesheet.json");
        doc.write_json(&path).unwrap();
        path
    }

    #[test]
    fn test_extracts_frames() {
        let dir = tempfile::tempdir().unwrap();
        let json = write_export(dir.path());
        let png = dir.path().join("sheet.png");
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]))
            .save(&png)
            .unwrap();
        let out = dir.path().join("output_sprites");

        handle(&json, &png, &out, Some("equipObjects")).unwrap();
        assert!(out.join("equipObjects").join("sword_0.png").is_file());
    }

    #[test]
    fn test_unknown_sheet_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let json = write_export(dir.path());
        let out = dir.path().join("output_sprites");

        // The sheet image is never opened when the sheet is unknown
        handle(&json, &dir.path().join("missing.png"), &out, Some("mapObjects")).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_sheet_image() {
        let dir = tempfile::tempdir().unwrap();
        let json = write_export(dir.path());

        let err = handle(&json, &dir.path().join("missing.png"), dir.path(), None).unwrap_err();
        assert!(err.downcast_ref::<spritesheet::Error>().is_some());
    }
}
