//! Shelf bin-packing
//!
//! Rectangles are sorted tallest first and laid left to right in horizontal
//! shelves. When a rectangle does not fit on the current shelf a new shelf
//! is opened below it; when there is no vertical room left the sheet is
//! full and the caller opens another one.

use std::path::PathBuf;

use crate::natural::natural_cmp;
use crate::PackingError;

/// An image to place, measured but not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rect {
    /// File stem of the source image
    pub id: String,
    pub path: PathBuf,
    pub w: u32,
    pub h: u32,
}

/// A rectangle's final position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
    pub sheet_index: usize,
}

/// Packing state for a single output sheet
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    max_w: u32,
    max_h: u32,
    padding: u32,
    sheet_index: usize,

    cursor_x: u32,
    cursor_y: u32,
    /// Height of the open shelf including padding, 0 until it has a member
    shelf_h: u32,

    used_w: u32,
    used_h: u32,

    placements: Vec<Placed>,
}

impl ShelfPacker {
    pub fn new(max_w: u32, max_h: u32, padding: u32, sheet_index: usize) -> Self {
        Self {
            max_w,
            max_h,
            padding,
            sheet_index,
            cursor_x: padding,
            cursor_y: padding,
            shelf_h: 0,
            used_w: 0,
            used_h: 0,
            placements: Vec::new(),
        }
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    pub fn placements(&self) -> &[Placed] {
        &self.placements
    }

    /// Whether `rect` could be placed on an empty sheet of this size
    pub fn fits_empty(&self, rect: &Rect) -> bool {
        let pad = u64::from(self.padding);
        pad + u64::from(rect.w) + pad <= u64::from(self.max_w)
            && pad + u64::from(rect.h) + pad <= u64::from(self.max_h)
    }

    /// Place `rect` on this sheet; `false` means the sheet is full
    ///
    /// Nothing is modified when the rectangle does not fit.
    pub fn try_place(&mut self, rect: &Rect) -> bool {
        let pad = u64::from(self.padding);
        let (w, h) = (u64::from(rect.w), u64::from(rect.h));
        let max_w = u64::from(self.max_w);
        let max_h = u64::from(self.max_h);

        let shelf_h = if self.shelf_h == 0 {
            h + pad
        } else {
            u64::from(self.shelf_h)
        };

        // Current shelf
        if u64::from(self.cursor_x) + w + pad <= max_w
            && u64::from(self.cursor_y) + h + pad <= max_h
        {
            self.shelf_h = shelf_h as u32;
            self.commit(rect, self.cursor_x, self.cursor_y);
            return true;
        }

        // New shelf below
        let new_y = u64::from(self.cursor_y) + shelf_h;
        if new_y + h + pad > max_h || pad + w + pad > max_w {
            return false;
        }

        self.cursor_y = new_y as u32;
        self.cursor_x = self.padding;
        self.shelf_h = (h + pad) as u32;
        self.commit(rect, self.cursor_x, self.cursor_y);
        true
    }

    fn commit(&mut self, rect: &Rect, x: u32, y: u32) {
        let pad = self.padding;
        self.cursor_x = x + rect.w + pad;
        self.used_w = self.used_w.max(x + rect.w + pad);
        self.used_h = self.used_h.max(y + rect.h + pad);

        self.placements.push(Placed {
            rect: rect.clone(),
            x,
            y,
            sheet_index: self.sheet_index,
        });
    }

    /// Realized sheet size: the used area, at least 1x1, at most the maximum
    pub fn dims_used(&self) -> (u32, u32) {
        (
            self.used_w.clamp(1, self.max_w.max(1)),
            self.used_h.clamp(1, self.max_h.max(1)),
        )
    }
}

/// Packing order: height desc, width desc, then natural id order
pub fn sort_for_packing(rects: &mut [Rect]) {
    rects.sort_by(|a, b| {
        b.h.cmp(&a.h)
            .then_with(|| b.w.cmp(&a.w))
            .then_with(|| natural_cmp(&a.id, &b.id))
    });
}

/// Pack every rectangle into square sheets of `max_size`
///
/// Returns one packer per sheet. With `single_sheet` a full first sheet is
/// an error; otherwise a new sheet is opened and the rectangle retried.
pub fn plan(
    mut rects: Vec<Rect>,
    max_size: u32,
    padding: u32,
    single_sheet: bool,
) -> Result<Vec<ShelfPacker>, PackingError> {
    sort_for_packing(&mut rects);

    let mut sheets = vec![ShelfPacker::new(max_size, max_size, padding, 0)];

    for rect in &rects {
        let current = sheets.len() - 1;
        if sheets[current].try_place(rect) {
            continue;
        }

        let oversized = || PackingError::ExceedsMaxDimension {
            id: rect.id.clone(),
            w: rect.w,
            h: rect.h,
            max_size,
        };

        if !sheets[current].fits_empty(rect) {
            return Err(oversized());
        }

        if single_sheet {
            return Err(PackingError::ExceedsSingleSheet {
                id: rect.id.clone(),
                max_size,
            });
        }

        tracing::debug!(sheet = current + 1, id = %rect.id, "sheet full, opening next sheet");
        let mut next = ShelfPacker::new(max_size, max_size, padding, current + 1);
        if !next.try_place(rect) {
            return Err(oversized());
        }
        sheets.push(next);
    }

    Ok(sheets)
}
