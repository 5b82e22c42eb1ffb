//! `spritesheet.json` export
//!
//! Walks a decoded atlas, drops sheets outside the allow-list and sprites
//! failing the size predicate, and groups the remaining frames by sprite
//! name. Key order and field names here are what downstream tools read.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atlas::{Position, Sprite, SpriteAtlasRoot, SpriteSheet};
use crate::requirements::Requirements;
use crate::{Error, FormatError, Result};

type DecodeResult<T> = std::result::Result<T, FormatError>;

/// Exact declared sprite size, e.g. 8x8 for gear icons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSize {
    pub w: f32,
    pub h: f32,
}

impl SpriteSize {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    /// Parse `WxH` (e.g. `8x8`, `16X16`)
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }

    pub fn matches(&self, position: &Position) -> bool {
        position.w == self.w && position.h == self.h
    }
}

/// Serialized sprite fields, arrays in canonical order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    /// `[x, y, w, h]`
    pub position: [f32; 4],
    /// `[x, y, w, h]`
    pub mask_position: [f32; 4],
    /// `[r, g, b, a]`
    pub color: [f32; 4],
    pub transparent: bool,
}

/// JSON has no NaN or infinity, so such values are rejected at decode
fn finite(values: [f32; 4], field: &'static str) -> DecodeResult<[f32; 4]> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(FormatError::NonFinite { field, value }),
        None => Ok(values),
    }
}

impl FrameData {
    pub fn from_sprite(sprite: &Sprite<'_>) -> DecodeResult<Self> {
        Ok(Self {
            position: finite(sprite.position()?.to_array(), "position")?,
            mask_position: finite(sprite.mask_position()?.to_array(), "mask_position")?,
            color: finite(sprite.color()?.to_array(), "color")?,
            transparent: sprite.is_transparent()?,
        })
    }
}

/// A sheet frame with its raw position in the sheet's sprite list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(flatten)]
    pub data: FrameData,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteGroup {
    pub name: String,
    #[serde(rename = "spriteLocation")]
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRecord {
    pub name: String,
    #[serde(rename = "atlasId")]
    pub atlas_id: i32,
    pub sprites: Vec<SpriteGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedRecord {
    pub name: String,
    pub index: i32,
    pub set: i32,
    pub direction: i32,
    pub action: i32,
    pub sprite: FrameData,
}

/// The complete `spritesheet.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Export {
    pub spritesheets: Vec<SheetRecord>,
    pub animated_sprites: Vec<AnimatedRecord>,
}

impl Export {
    /// Write pretty-printed JSON, replacing any existing file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Total number of sheet frames across all groups
    pub fn frame_count(&self) -> usize {
        self.spritesheets
            .iter()
            .flat_map(|sheet| &sheet.sprites)
            .map(|group| group.frames.len())
            .sum()
    }
}

/// Build the export document from a decoded atlas
///
/// Any decode failure aborts the whole export and names the sheet or
/// animated sprite it came from.
pub fn build(
    root: &SpriteAtlasRoot<'_>,
    requirements: &Requirements,
    size: Option<SpriteSize>,
) -> DecodeResult<Export> {
    let export = Export {
        spritesheets: build_sheets(root, requirements, size)?,
        animated_sprites: build_animated(root, size)?,
    };

    tracing::info!(
        sheets = export.spritesheets.len(),
        frames = export.frame_count(),
        animated = export.animated_sprites.len(),
        "built atlas export"
    );

    Ok(export)
}

pub fn build_sheets(
    root: &SpriteAtlasRoot<'_>,
    requirements: &Requirements,
    size: Option<SpriteSize>,
) -> DecodeResult<Vec<SheetRecord>> {
    let count = root.sheets_len()?;
    let mut records = Vec::new();

    for i in 0..count {
        let sheet = root.sheet(i).map_err(|e| e.in_record(format!("sheet {i}")))?;
        let name = sheet
            .name()
            .map_err(|e| e.in_record(format!("sheet {i}")))?;

        if !requirements.allows(name) {
            tracing::debug!(sheet = name, "skipping sheet not in requirements");
            continue;
        }

        let record = build_sheet(&sheet, name, size)
            .map_err(|e| e.in_record(format!("sheet {i} ({name})")))?;
        records.push(record);
    }

    tracing::debug!(considered = count, kept = records.len(), "filtered sheets");
    Ok(records)
}

fn build_sheet(
    sheet: &SpriteSheet<'_>,
    name: &str,
    size: Option<SpriteSize>,
) -> DecodeResult<SheetRecord> {
    let mut groups: Vec<SpriteGroup> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for j in 0..sheet.sprites_len()? {
        let frame = sheet_frame(sheet, j, size).map_err(|e| e.in_record(format!("sprite {j}")))?;
        let Some((sprite_name, data)) = frame else {
            continue;
        };

        let slot = *by_name.entry(sprite_name).or_insert_with(|| {
            groups.push(SpriteGroup {
                name: sprite_name.to_string(),
                frames: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].frames.push(Frame { data, index: j });
    }

    Ok(SheetRecord {
        name: name.to_string(),
        atlas_id: sheet.atlas_id()?,
        sprites: groups,
    })
}

/// Name and fields of sprite `j`, or `None` when it fails the size predicate
fn sheet_frame<'a>(
    sheet: &SpriteSheet<'a>,
    j: usize,
    size: Option<SpriteSize>,
) -> DecodeResult<Option<(&'a str, FrameData)>> {
    let sprite = sheet.sprite(j)?;
    if !size_matches(&sprite, size)? {
        return Ok(None);
    }
    Ok(Some((sprite.name()?, FrameData::from_sprite(&sprite)?)))
}

fn size_matches(sprite: &Sprite<'_>, size: Option<SpriteSize>) -> DecodeResult<bool> {
    match size {
        Some(size) => Ok(size.matches(&sprite.position()?)),
        None => Ok(true),
    }
}

pub fn build_animated(
    root: &SpriteAtlasRoot<'_>,
    size: Option<SpriteSize>,
) -> DecodeResult<Vec<AnimatedRecord>> {
    let mut records = Vec::new();

    for i in 0..root.animated_sprites_len()? {
        let record = animated_record(root, i, size)
            .map_err(|e| e.in_record(format!("animated sprite {i}")))?;
        records.extend(record);
    }

    Ok(records)
}

fn animated_record(
    root: &SpriteAtlasRoot<'_>,
    i: usize,
    size: Option<SpriteSize>,
) -> DecodeResult<Option<AnimatedRecord>> {
    let anim = root.animated_sprite(i)?;
    let sprite = anim.sprite()?;
    if !size_matches(&sprite, size)? {
        return Ok(None);
    }

    Ok(Some(AnimatedRecord {
        name: anim.name()?.to_string(),
        index: anim.index()?,
        set: anim.set()?,
        direction: anim.direction()?,
        action: anim.action()?,
        sprite: FrameData::from_sprite(&sprite)?,
    }))
}
