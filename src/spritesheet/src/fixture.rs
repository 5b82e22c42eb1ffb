//! Test-only flatbuffer writer
//!
//! Lays tables out front-to-back (parent before children) so every
//! `uoffset_t` points forward, as the format requires.

use crate::atlas::slots;

#[derive(Debug, Clone)]
pub enum FieldValue {
    I32(i32),
    Bool(bool),
    Str(String),
    Struct([f32; 4]),
    Table(TableBuilder),
    Vector(Vec<TableBuilder>),
}

impl FieldValue {
    fn inline_size(&self) -> usize {
        match self {
            FieldValue::Struct(_) => 16,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    fields: Vec<Option<FieldValue>>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, slot: usize, value: FieldValue) -> Self {
        if self.fields.len() <= slot {
            self.fields.resize(slot + 1, None);
        }
        self.fields[slot] = Some(value);
        self
    }
}

/// Serialize `root` into a complete buffer
pub fn finish(root: &TableBuilder) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    let pos = write_table(&mut buf, root);
    buf[0..4].copy_from_slice(&(pos as u32).to_le_bytes());
    buf
}

fn align(buf: &mut Vec<u8>, n: usize) {
    while buf.len() % n != 0 {
        buf.push(0);
    }
}

fn patch(buf: &mut [u8], at: usize, target: usize) {
    let rel = (target - at) as u32;
    buf[at..at + 4].copy_from_slice(&rel.to_le_bytes());
}

fn write_table(buf: &mut Vec<u8>, table: &TableBuilder) -> usize {
    let mut offsets = vec![0u16; table.fields.len()];
    let mut inline_len = 4usize;
    for (slot, value) in table.fields.iter().enumerate() {
        if let Some(value) = value {
            offsets[slot] = inline_len as u16;
            inline_len += value.inline_size();
        }
    }

    align(buf, 2);
    let vtable = buf.len();
    let vtable_len = 4 + 2 * offsets.len();
    buf.extend_from_slice(&(vtable_len as u16).to_le_bytes());
    buf.extend_from_slice(&(inline_len as u16).to_le_bytes());
    for offset in &offsets {
        buf.extend_from_slice(&offset.to_le_bytes());
    }

    align(buf, 4);
    let pos = buf.len();
    buf.extend_from_slice(&((pos - vtable) as i32).to_le_bytes());

    let mut refs = Vec::new();
    for value in table.fields.iter().flatten() {
        match value {
            FieldValue::I32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            FieldValue::Bool(b) => buf.extend_from_slice(&[*b as u8, 0, 0, 0]),
            FieldValue::Struct(values) => {
                for v in values {
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
            FieldValue::Str(_) | FieldValue::Table(_) | FieldValue::Vector(_) => {
                refs.push((buf.len(), value));
                buf.extend_from_slice(&[0; 4]);
            }
        }
    }

    for (at, value) in refs {
        let target = match value {
            FieldValue::Str(s) => write_string(buf, s),
            FieldValue::Table(child) => write_table(buf, child),
            FieldValue::Vector(items) => write_vector(buf, items),
            _ => unreachable!("only reference fields are deferred"),
        };
        patch(buf, at, target);
    }

    pos
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> usize {
    align(buf, 4);
    let start = buf.len();
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    start
}

fn write_vector(buf: &mut Vec<u8>, items: &[TableBuilder]) -> usize {
    align(buf, 4);
    let start = buf.len();
    buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
    buf.resize(buf.len() + items.len() * 4, 0);

    for (i, item) in items.iter().enumerate() {
        let at = start + 4 + i * 4;
        let target = write_table(buf, item);
        patch(buf, at, target);
    }

    start
}

// Sprite atlas shaped helpers

#[derive(Debug, Clone)]
pub struct SpriteDef {
    pub name: String,
    pub position: [f32; 4],
    pub mask_position: Option<[f32; 4]>,
    pub color: [f32; 4],
    pub transparent: bool,
}

impl SpriteDef {
    pub fn new(name: &str, position: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            position,
            mask_position: Some([0.0; 4]),
            color: [1.0, 1.0, 1.0, 1.0],
            transparent: false,
        }
    }

    fn table(&self) -> TableBuilder {
        let mut table = TableBuilder::new()
            .field(slots::SPRITE_POSITION, FieldValue::Struct(self.position))
            .field(slots::SPRITE_COLOR, FieldValue::Struct(self.color))
            .field(slots::SPRITE_TRANSPARENT, FieldValue::Bool(self.transparent))
            .field(slots::SPRITE_NAME, FieldValue::Str(self.name.clone()));
        if let Some(mask) = self.mask_position {
            table = table.field(slots::SPRITE_MASK_POSITION, FieldValue::Struct(mask));
        }
        table
    }
}

#[derive(Debug, Clone)]
pub struct SheetDef {
    pub name: String,
    pub atlas_id: i32,
    pub sprites: Vec<SpriteDef>,
}

impl SheetDef {
    pub fn new(name: &str, atlas_id: i32, sprites: Vec<SpriteDef>) -> Self {
        Self {
            name: name.to_string(),
            atlas_id,
            sprites,
        }
    }

    fn table(&self) -> TableBuilder {
        TableBuilder::new()
            .field(slots::SHEET_NAME, FieldValue::Str(self.name.clone()))
            .field(slots::SHEET_ATLAS_ID, FieldValue::I32(self.atlas_id))
            .field(
                slots::SHEET_SPRITES,
                FieldValue::Vector(self.sprites.iter().map(SpriteDef::table).collect()),
            )
    }
}

#[derive(Debug, Clone)]
pub struct AnimatedDef {
    pub name: String,
    pub index: i32,
    pub set: i32,
    pub direction: i32,
    pub action: i32,
    pub sprite: SpriteDef,
}

impl AnimatedDef {
    pub fn new(name: &str, index: i32, sprite: SpriteDef) -> Self {
        Self {
            name: name.to_string(),
            index,
            set: 0,
            direction: 0,
            action: 0,
            sprite,
        }
    }

    fn table(&self) -> TableBuilder {
        TableBuilder::new()
            .field(slots::ANIMATED_NAME, FieldValue::Str(self.name.clone()))
            .field(slots::ANIMATED_INDEX, FieldValue::I32(self.index))
            .field(slots::ANIMATED_SET, FieldValue::I32(self.set))
            .field(slots::ANIMATED_DIRECTION, FieldValue::I32(self.direction))
            .field(slots::ANIMATED_ACTION, FieldValue::I32(self.action))
            .field(slots::ANIMATED_SPRITE, FieldValue::Table(self.sprite.table()))
    }
}

/// Build a complete `SpriteSheetRoot` buffer
pub fn atlas(sheets: &[SheetDef], animated: &[AnimatedDef]) -> Vec<u8> {
    let root = TableBuilder::new()
        .field(
            slots::ROOT_SHEETS,
            FieldValue::Vector(sheets.iter().map(SheetDef::table).collect()),
        )
        .field(
            slots::ROOT_ANIMATED,
            FieldValue::Vector(animated.iter().map(AnimatedDef::table).collect()),
        );
    finish(&root)
}
