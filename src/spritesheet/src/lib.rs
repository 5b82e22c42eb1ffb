//! Sprite atlas toolkit
//!
//! Two independent pipelines live here.
//!
//! # Atlas export
//!
//! The game ships its sprite atlas metadata as a flatbuffer blob
//! (`spritesheetf`). [`AtlasFile`] reads it, [`SpriteAtlasRoot`] exposes lazy
//! typed accessors over the buffer, [`Requirements`] restricts which sheets
//! are kept, and [`export::build`] produces the `spritesheet.json` document.
//!
//! ## Binary layout
//!
//! - `SpriteSheetRoot`: `sprites: [SpriteSheet]`, `animated_sprites: [AnimatedSprite]`
//! - `SpriteSheet`: `name: string`, `atlas_id: int`, `sprites: [Sprite]`
//! - `Sprite`: `position: Position`, `mask_position: Position`, `color: Color`,
//!   `is_transparent: bool`, `name: string`
//! - `AnimatedSprite`: `name`, `index`, `set`, `direction`, `action`, `sprite: Sprite`
//! - `Position` / `Color`: four little-endian `f32` each (x, y, w, h / r, g, b, a)
//!
//! # Packing
//!
//! [`pack::build_spritesheet`] shelf-packs a directory of PNGs into one or
//! more sheets and writes a JSON index next to them.

mod atlas;
mod color;
pub mod export;
pub mod extract;
mod flatbuffer;
mod natural;
pub mod pack;
pub mod packer;
mod requirements;
pub mod stats;

#[cfg(test)]
mod fixture;

use std::path::PathBuf;

pub use atlas::{
    AnimatedSprite, AtlasFile, Color, Position, Sprite, SpriteAtlasRoot, SpriteSheet,
};
pub use color::parse_background;
pub use export::{Export, SpriteSize};
pub use natural::{natural_cmp, natural_key};
pub use pack::{build_spritesheet, PackOptions, PackedAtlas};
pub use packer::{Placed, Rect, ShelfPacker};
pub use requirements::Requirements;

/// Default file name for the exported atlas document
pub const DEFAULT_EXPORT_FILE: &str = "spritesheet.json";

/// Default file name for the sheet allow-list
pub const DEFAULT_REQUIREMENTS_FILE: &str = "spriteMapRequirements.json";

/// Malformed binary atlas data
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("Data too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },

    #[error("{what} at offset {offset} is outside the {len}-byte buffer")]
    OutOfBounds {
        what: &'static str,
        offset: usize,
        len: usize,
    },

    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("Missing required field {table}.{field}")]
    MissingField {
        table: &'static str,
        field: &'static str,
    },

    #[error("Non-finite value {value} in {field}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("{record}: {source}")]
    InRecord {
        record: String,
        #[source]
        source: Box<FormatError>,
    },
}

impl FormatError {
    /// Attach the identity of the record being decoded
    pub fn in_record(self, record: impl Into<String>) -> Self {
        FormatError::InRecord {
            record: record.into(),
            source: Box::new(self),
        }
    }
}

/// A rectangle that cannot be placed under the packing constraints
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PackingError {
    #[error(
        "Sprites do not fit into a single sheet of size {max_size}x{max_size} \
         (stopped at '{id}'). Increase the max size or allow multiple sheets."
    )]
    ExceedsSingleSheet { id: String, max_size: u32 },

    #[error("Rect '{id}' ({w}x{h}) cannot fit in an empty sheet of {max_size}x{max_size}")]
    ExceedsMaxDimension {
        id: String,
        w: u32,
        h: u32,
        max_size: u32,
    },
}

/// Errors from atlas decoding, export and packing
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed atlas {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Packing(#[from] PackingError),

    #[error("No .png files found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("Invalid background color '{0}': use #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
}

impl Error {
    /// Map an IO error, turning `NotFound` into [`Error::NotFound`]
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path)
        } else {
            Error::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
