//! Typed views over the sprite atlas flatbuffer
//!
//! Each accessor resolves its field on demand from the buffer. Nothing is
//! copied until a caller asks for it.

use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::flatbuffer::{self, Table};
use crate::{Error, FormatError, Result};

type DecodeResult<T> = std::result::Result<T, FormatError>;

/// Vtable slots of the atlas schema
pub(crate) mod slots {
    pub const ROOT_SHEETS: usize = 0;
    pub const ROOT_ANIMATED: usize = 1;

    pub const SHEET_NAME: usize = 0;
    pub const SHEET_ATLAS_ID: usize = 1;
    pub const SHEET_SPRITES: usize = 2;

    pub const SPRITE_POSITION: usize = 0;
    pub const SPRITE_MASK_POSITION: usize = 1;
    pub const SPRITE_COLOR: usize = 2;
    pub const SPRITE_TRANSPARENT: usize = 3;
    pub const SPRITE_NAME: usize = 4;

    pub const ANIMATED_NAME: usize = 0;
    pub const ANIMATED_INDEX: usize = 1;
    pub const ANIMATED_SET: usize = 2;
    pub const ANIMATED_DIRECTION: usize = 3;
    pub const ANIMATED_ACTION: usize = 4;
    pub const ANIMATED_SPRITE: usize = 5;
}

/// Size of the `Position` and `Color` structs
const VEC4_SIZE: usize = 16;

fn read_vec4(bytes: &[u8]) -> [f32; 4] {
    let mut out = [0.0; 4];
    LittleEndian::read_f32_into(&bytes[..VEC4_SIZE], &mut out);
    out
}

/// Sprite rectangle in atlas units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Position {
    /// Canonical `[x, y, w, h]` order
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let [x, y, w, h] = read_vec4(bytes);
        Self { x, y, w, h }
    }
}

/// Tint color
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let [r, g, b, a] = read_vec4(bytes);
        Self { r, g, b, a }
    }
}

/// Root of a decoded atlas: sheets and animated sprites
#[derive(Debug, Clone, Copy)]
pub struct SpriteAtlasRoot<'a> {
    table: Table<'a>,
}

impl<'a> SpriteAtlasRoot<'a> {
    /// Validate the root marker and return a lazy view over `data`
    pub fn from_bytes(data: &'a [u8]) -> DecodeResult<Self> {
        let table = flatbuffer::root(data)?;
        // Resolve both top-level vectors so a corrupt root fails here
        table.vector(slots::ROOT_SHEETS, "sheets")?;
        table.vector(slots::ROOT_ANIMATED, "animated sprites")?;
        Ok(Self { table })
    }

    pub fn sheets_len(&self) -> DecodeResult<usize> {
        Ok(self.table.vector(slots::ROOT_SHEETS, "sheets")?.len())
    }

    pub fn sheet(&self, index: usize) -> DecodeResult<SpriteSheet<'a>> {
        let table = self
            .table
            .vector(slots::ROOT_SHEETS, "sheets")?
            .table(index)?;
        Ok(SpriteSheet { table })
    }

    pub fn animated_sprites_len(&self) -> DecodeResult<usize> {
        Ok(self
            .table
            .vector(slots::ROOT_ANIMATED, "animated sprites")?
            .len())
    }

    pub fn animated_sprite(&self, index: usize) -> DecodeResult<AnimatedSprite<'a>> {
        let table = self
            .table
            .vector(slots::ROOT_ANIMATED, "animated sprites")?
            .table(index)?;
        Ok(AnimatedSprite { table })
    }
}

/// One named sheet and its raw, ungrouped sprite entries
#[derive(Debug, Clone, Copy)]
pub struct SpriteSheet<'a> {
    table: Table<'a>,
}

impl<'a> SpriteSheet<'a> {
    pub fn name(&self) -> DecodeResult<&'a str> {
        Ok(self
            .table
            .string(slots::SHEET_NAME, "sheet name")?
            .unwrap_or_default())
    }

    pub fn atlas_id(&self) -> DecodeResult<i32> {
        self.table.i32(slots::SHEET_ATLAS_ID, "sheet atlas id")
    }

    pub fn sprites_len(&self) -> DecodeResult<usize> {
        Ok(self.table.vector(slots::SHEET_SPRITES, "sprites")?.len())
    }

    pub fn sprite(&self, index: usize) -> DecodeResult<Sprite<'a>> {
        let table = self
            .table
            .vector(slots::SHEET_SPRITES, "sprites")?
            .table(index)?;
        Ok(Sprite { table })
    }
}

/// A single sprite frame
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    table: Table<'a>,
}

impl<'a> Sprite<'a> {
    pub fn position(&self) -> DecodeResult<Position> {
        self.table
            .struct_bytes(slots::SPRITE_POSITION, VEC4_SIZE, "sprite position")?
            .map(Position::from_bytes)
            .ok_or(FormatError::MissingField {
                table: "Sprite",
                field: "position",
            })
    }

    /// Mask rectangle; all zeros when the sprite has none
    pub fn mask_position(&self) -> DecodeResult<Position> {
        Ok(self
            .table
            .struct_bytes(slots::SPRITE_MASK_POSITION, VEC4_SIZE, "sprite mask position")?
            .map(Position::from_bytes)
            .unwrap_or_default())
    }

    pub fn color(&self) -> DecodeResult<Color> {
        self.table
            .struct_bytes(slots::SPRITE_COLOR, VEC4_SIZE, "sprite color")?
            .map(Color::from_bytes)
            .ok_or(FormatError::MissingField {
                table: "Sprite",
                field: "color",
            })
    }

    pub fn is_transparent(&self) -> DecodeResult<bool> {
        self.table.bool(slots::SPRITE_TRANSPARENT, "sprite transparency")
    }

    pub fn name(&self) -> DecodeResult<&'a str> {
        Ok(self
            .table
            .string(slots::SPRITE_NAME, "sprite name")?
            .unwrap_or_default())
    }
}

/// One frame of a character/entity animation
#[derive(Debug, Clone, Copy)]
pub struct AnimatedSprite<'a> {
    table: Table<'a>,
}

impl<'a> AnimatedSprite<'a> {
    pub fn name(&self) -> DecodeResult<&'a str> {
        Ok(self
            .table
            .string(slots::ANIMATED_NAME, "animated sprite name")?
            .unwrap_or_default())
    }

    pub fn index(&self) -> DecodeResult<i32> {
        self.table.i32(slots::ANIMATED_INDEX, "animated sprite index")
    }

    pub fn set(&self) -> DecodeResult<i32> {
        self.table.i32(slots::ANIMATED_SET, "animated sprite set")
    }

    pub fn direction(&self) -> DecodeResult<i32> {
        self.table
            .i32(slots::ANIMATED_DIRECTION, "animated sprite direction")
    }

    pub fn action(&self) -> DecodeResult<i32> {
        self.table.i32(slots::ANIMATED_ACTION, "animated sprite action")
    }

    pub fn sprite(&self) -> DecodeResult<Sprite<'a>> {
        self.table
            .table(slots::ANIMATED_SPRITE, "animated sprite payload")?
            .map(|table| Sprite { table })
            .ok_or(FormatError::MissingField {
                table: "AnimatedSprite",
                field: "sprite",
            })
    }
}

/// An atlas binary read fully into memory
#[derive(Debug, Clone)]
pub struct AtlasFile {
    path: PathBuf,
    data: Vec<u8>,
}

impl AtlasFile {
    /// Read the whole file; the handle is closed before returning
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "read atlas binary");
        Ok(Self { path, data })
    }

    /// Wrap bytes already in memory, `path` is used for error messages
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> Result<SpriteAtlasRoot<'_>> {
        SpriteAtlasRoot::from_bytes(&self.data).map_err(|source| self.format_error(source))
    }

    /// Attach this file's path to a decode failure
    pub fn format_error(&self, source: FormatError) -> Error {
        Error::Format {
            path: self.path.clone(),
            source,
        }
    }
}
