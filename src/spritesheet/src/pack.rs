//! Directory to spritesheet pipeline
//!
//! Image sizes are read from headers first, packing is planned without
//! touching pixel data, and only then is each sheet composited and written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::natural::natural_cmp;
use crate::packer::{self, Rect, ShelfPacker};
use crate::{Error, Result};

/// Packer settings
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Base name for `<basename>.png` / `<basename>_<n>.png` and `<basename>.json`
    pub basename: String,
    /// Max width and height of a sheet
    pub max_size: u32,
    /// Pixels between sprites
    pub padding: u32,
    pub background: Rgba<u8>,
    /// Fail instead of spilling over to a second sheet
    pub single_sheet: bool,
    /// Also scan subdirectories of the input
    pub recursive: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            basename: "spritesheet".to_string(),
            max_size: 8192,
            padding: 1,
            background: Rgba([0, 0, 0, 0]),
            single_sheet: false,
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub file: String,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub generated: String,
    pub tool: String,
    pub input: String,
    pub padding: u32,
    pub max_size: u32,
    pub sheet_count: usize,
    pub sheets: Vec<SheetInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteEntry {
    pub sheet: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// The JSON index written next to the packed sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedAtlas {
    pub meta: Meta,
    pub sprites: BTreeMap<String, SpriteEntry>,
}

impl PackedAtlas {
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// List `.png` files (case-insensitive) in `input_dir`
///
/// Returned in natural order of file name.
pub fn find_pngs(input_dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(Error::NotFound(input_dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(input_dir).max_depth(max_depth) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(input_dir).to_path_buf();
            Error::Io {
                path,
                source: e.into(),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_png = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));

        if is_png {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read each image's dimensions, skipping unreadable files
pub fn measure(files: &[PathBuf]) -> Vec<Rect> {
    files
        .iter()
        .filter_map(|path| {
            let id = path.file_stem()?.to_string_lossy().into_owned();
            match image::image_dimensions(path) {
                Ok((w, h)) => Some(Rect {
                    id,
                    path: path.clone(),
                    w,
                    h,
                }),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping image: cannot read size"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Sheet file name for sheet `index` of `count`
pub fn sheet_file_name(basename: &str, index: usize, count: usize) -> String {
    if count == 1 {
        format!("{basename}.png")
    } else {
        format!("{basename}_{index}.png")
    }
}

/// Pack every PNG in `input_dir` into sheets under `out_dir`
///
/// Writes the sheet PNGs and `<basename>.json`, and returns the index.
pub fn build_spritesheet(
    input_dir: &Path,
    out_dir: &Path,
    opts: &PackOptions,
) -> Result<PackedAtlas> {
    let files = find_pngs(input_dir, opts.recursive)?;
    if files.is_empty() {
        return Err(Error::NoImages(input_dir.to_path_buf()));
    }

    let rects = measure(&files);
    if rects.is_empty() {
        return Err(Error::NoImages(input_dir.to_path_buf()));
    }
    tracing::info!(images = rects.len(), input = %input_dir.display(), "measured images");

    let sheets = packer::plan(rects, opts.max_size, opts.padding, opts.single_sheet)?;

    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
    let input_abs = std::path::absolute(input_dir).map_err(|e| Error::io(input_dir, e))?;

    let mut infos = Vec::with_capacity(sheets.len());
    let mut sprites = BTreeMap::new();

    for sheet in &sheets {
        let name = sheet_file_name(&opts.basename, sheet.sheet_index(), sheets.len());
        let info = write_sheet(sheet, &out_dir.join(&name), &name, opts.background)?;

        for placed in sheet.placements() {
            let entry = SpriteEntry {
                sheet: name.clone(),
                x: placed.x,
                y: placed.y,
                w: placed.rect.w,
                h: placed.rect.h,
            };
            if sprites.insert(placed.rect.id.clone(), entry).is_some() {
                tracing::warn!(
                    id = %placed.rect.id,
                    "duplicate sprite id, keeping the later placement"
                );
            }
        }

        infos.push(info);
    }

    let atlas = PackedAtlas {
        meta: Meta {
            generated: chrono::Utc::now().to_rfc3339(),
            tool: concat!("spritesheet ", env!("CARGO_PKG_VERSION")).to_string(),
            input: input_abs.display().to_string(),
            padding: opts.padding,
            max_size: opts.max_size,
            sheet_count: infos.len(),
            sheets: infos,
        },
        sprites,
    };

    let json_path = out_dir.join(format!("{}.json", opts.basename));
    let json = serde_json::to_string_pretty(&atlas).map_err(|source| Error::Json {
        path: json_path.clone(),
        source,
    })?;
    std::fs::write(&json_path, json).map_err(|e| Error::io(&json_path, e))?;
    tracing::info!(path = %json_path.display(), "wrote atlas JSON");

    Ok(atlas)
}

/// Composite one sheet and save it as PNG
fn write_sheet(
    sheet: &ShelfPacker,
    path: &Path,
    name: &str,
    background: Rgba<u8>,
) -> Result<SheetInfo> {
    let (w, h) = sheet.dims_used();
    let mut canvas = RgbaImage::from_pixel(w, h, background);

    for placed in sheet.placements() {
        let source = &placed.rect.path;
        let img = image::open(source)
            .map_err(|e| Error::Image {
                path: source.clone(),
                source: e,
            })?
            .to_rgba8();
        image::imageops::replace(&mut canvas, &img, i64::from(placed.x), i64::from(placed.y));
    }

    canvas
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::Image {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::info!(
        path = %path.display(),
        w,
        h,
        sprites = sheet.placements().len(),
        "wrote sheet"
    );

    Ok(SheetInfo {
        file: name.to_string(),
        w,
        h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_sheet_file_names() {
        assert_eq!(sheet_file_name("spritesheet", 0, 1), "spritesheet.png");
        assert_eq!(sheet_file_name("items", 0, 3), "items_0.png");
        assert_eq!(sheet_file_name("items", 2, 3), "items_2.png");
    }

    #[test]
    fn test_find_pngs() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "10.png", 1, 1, [0; 4]);
        write_png(dir.path(), "2.PNG", 1, 1, [0; 4]);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write_png(&dir.path().join("nested"), "1.png", 1, 1, [0; 4]);

        let flat = find_pngs(dir.path(), false).unwrap();
        let names: Vec<_> = flat.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["2.PNG", "10.png"]);

        let deep = find_pngs(dir.path(), true).unwrap();
        let names: Vec<_> = deep.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["1.png", "2.PNG", "10.png"]);
    }

    #[test]
    fn test_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("img");
        assert!(matches!(find_pngs(&missing, false), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_measure_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 3, 5, [0; 4]);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();

        let rects = measure(&[bad, good.clone()]);
        assert_eq!(
            rects,
            [Rect {
                id: "good".into(),
                path: good,
                w: 3,
                h: 5,
            }]
        );
    }

    #[test]
    fn test_empty_dir_is_error() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let err = build_spritesheet(input.path(), out.path(), &PackOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoImages(_)));
    }

    #[test]
    fn test_pack_three_icons() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png(input.path(), "a.png", 32, 32, [255, 0, 0, 255]);
        write_png(input.path(), "b.png", 16, 16, [0, 255, 0, 255]);
        write_png(input.path(), "c.png", 16, 16, [0, 0, 255, 255]);

        let opts = PackOptions {
            max_size: 64,
            padding: 1,
            single_sheet: true,
            ..PackOptions::default()
        };
        let atlas = build_spritesheet(input.path(), out.path(), &opts).unwrap();

        assert_eq!(atlas.meta.sheet_count, 1);
        assert_eq!(
            atlas.meta.sheets,
            [SheetInfo {
                file: "spritesheet.png".into(),
                w: 51,
                h: 51,
            }]
        );
        assert_eq!(atlas.sprites.len(), 3);
        assert!(atlas.sprites.values().all(|s| s.sheet == "spritesheet.png"));
        assert_eq!(
            atlas.sprites["a"],
            SpriteEntry {
                sheet: "spritesheet.png".into(),
                x: 1,
                y: 1,
                w: 32,
                h: 32,
            }
        );
        assert_eq!((atlas.sprites["b"].x, atlas.sprites["b"].y), (34, 1));
        assert_eq!((atlas.sprites["c"].x, atlas.sprites["c"].y), (1, 34));

        // Composited pixels land where the index says
        let sheet = image::open(out.path().join("spritesheet.png")).unwrap().to_rgba8();
        assert_eq!(sheet.dimensions(), (51, 51));
        assert_eq!(sheet.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(sheet.get_pixel(34, 1), &Rgba([0, 255, 0, 255]));
        assert_eq!(sheet.get_pixel(1, 34), &Rgba([0, 0, 255, 255]));
        assert_eq!(sheet.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));

        let written = PackedAtlas::read_json(out.path().join("spritesheet.json")).unwrap();
        assert_eq!(written, atlas);
    }

    #[test]
    fn test_relative_input_recorded_absolute() {
        let input = tempfile::Builder::new().tempdir_in(".").unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png(input.path(), "1.png", 4, 4, [1, 2, 3, 255]);
        assert!(input.path().is_relative());

        let atlas = build_spritesheet(input.path(), out.path(), &PackOptions::default()).unwrap();
        let recorded = Path::new(&atlas.meta.input);
        assert!(recorded.is_absolute(), "{}", atlas.meta.input);
        assert_eq!(recorded.file_name(), input.path().file_name());
    }

    #[test]
    fn test_pack_spills_and_uses_background() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_png(input.path(), &format!("{i}.png"), 20, 20, [9, 9, 9, 255]);
        }

        let opts = PackOptions {
            basename: "items".into(),
            max_size: 32,
            padding: 2,
            background: Rgba([1, 2, 3, 4]),
            ..PackOptions::default()
        };
        let atlas = build_spritesheet(input.path(), out.path(), &opts).unwrap();

        assert_eq!(atlas.meta.sheet_count, 5);
        for i in 0..5 {
            let file = format!("items_{i}.png");
            assert!(out.path().join(&file).is_file());
            assert_eq!(atlas.meta.sheets[i].file, file);
        }
        assert_eq!(atlas.sprites["0"].sheet, "items_0.png");
        assert!(out.path().join("items.json").is_file());

        let sheet = image::open(out.path().join("items_0.png")).unwrap().to_rgba8();
        assert_eq!(sheet.dimensions(), (24, 24));
        assert_eq!(sheet.get_pixel(0, 0), &Rgba([1, 2, 3, 4]));
        assert_eq!(sheet.get_pixel(2, 2), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn test_single_sheet_overflow_is_error() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_png(input.path(), &format!("{i}.png"), 20, 20, [0; 4]);
        }

        let opts = PackOptions {
            max_size: 32,
            single_sheet: true,
            ..PackOptions::default()
        };
        let err = build_spritesheet(input.path(), out.path(), &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::Packing(crate::PackingError::ExceedsSingleSheet { max_size: 32, .. })
        ));
    }
}
