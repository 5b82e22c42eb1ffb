//! Crop exported frames out of a sheet image
//!
//! Each frame of each sprite group becomes
//! `<out>/<sheet name>/<sprite name>_<index>.png`.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::export::{Export, Frame};
use crate::{Error, Result};

/// Make `name` a single path component that stays inside its directory
fn file_safe(name: &str) -> String {
    match name {
        "" | "." | ".." => "_".to_string(),
        _ => name.replace(['/', '\\'], "_"),
    }
}

/// Pixel rectangle of `frame` clipped to a `width` x `height` image
fn crop_rect(frame: &Frame, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let [x, y, w, h] = frame.data.position;
    let x0 = (x.max(0.0) as u32).min(width);
    let y0 = (y.max(0.0) as u32).min(height);
    let x1 = ((x + w).max(0.0) as u32).min(width);
    let y1 = ((y + h).max(0.0) as u32).min(height);

    (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
}

/// Crop every frame of `export` out of `sheet_image`
///
/// `only_sheet` restricts extraction to one sheet record. Returns the number
/// of files written.
pub fn extract_sprites(
    export: &Export,
    sheet_image: &Path,
    out_dir: &Path,
    only_sheet: Option<&str>,
) -> Result<usize> {
    let sheet = image::open(sheet_image)
        .map_err(|e| match e {
            image::ImageError::IoError(io) => Error::io(sheet_image, io),
            other => Error::Image {
                path: sheet_image.to_path_buf(),
                source: other,
            },
        })?
        .to_rgba8();
    let (width, height) = sheet.dimensions();

    let mut written = 0;
    for record in &export.spritesheets {
        if only_sheet.is_some_and(|name| name != record.name) {
            continue;
        }

        let sheet_dir = out_dir.join(file_safe(&record.name));
        std::fs::create_dir_all(&sheet_dir).map_err(|e| Error::io(&sheet_dir, e))?;

        for group in &record.sprites {
            for frame in &group.frames {
                let Some((x, y, w, h)) = crop_rect(frame, width, height) else {
                    tracing::warn!(
                        sheet = %record.name,
                        sprite = %group.name,
                        index = frame.index,
                        "frame outside the sheet image, skipping"
                    );
                    continue;
                };

                let path = frame_path(&sheet_dir, &group.name, frame.index);
                save_crop(&sheet, (x, y, w, h), &path)?;
                tracing::debug!(path = %path.display(), "saved sprite");
                written += 1;
            }
        }
    }

    tracing::info!(count = written, out = %out_dir.display(), "extracted sprites");
    Ok(written)
}

fn frame_path(sheet_dir: &Path, sprite: &str, index: usize) -> PathBuf {
    sheet_dir.join(format!("{}_{index}.png", file_safe(sprite)))
}

fn save_crop(sheet: &RgbaImage, (x, y, w, h): (u32, u32, u32, u32), path: &Path) -> Result<()> {
    image::imageops::crop_imm(sheet, x, y, w, h)
        .to_image()
        .save(path)
        .map_err(|e| Error::Image {
            path: path.to_path_buf(),
            source: e,
        })
}
