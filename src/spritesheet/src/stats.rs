//! Per-atlas summary of an exported `spritesheet.json`

use std::collections::BTreeMap;

use serde::Serialize;

use crate::export::Export;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtlasSummary {
    pub sheets: usize,
    /// Distinct sprite names
    pub sprites: usize,
    pub frames: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub atlases: BTreeMap<i32, AtlasSummary>,
    pub animated_sprites: usize,
}

pub fn summarize(export: &Export) -> Stats {
    let mut atlases: BTreeMap<i32, AtlasSummary> = BTreeMap::new();

    for sheet in &export.spritesheets {
        let summary = atlases.entry(sheet.atlas_id).or_default();
        summary.sheets += 1;
        summary.sprites += sheet.sprites.len();
        summary.frames += sheet.sprites.iter().map(|g| g.frames.len()).sum::<usize>();
    }

    Stats {
        atlases,
        animated_sprites: export.animated_sprites.len(),
    }
}
