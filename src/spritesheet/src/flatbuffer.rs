//! Minimal flatbuffer reader
//!
//! Only what the sprite atlas schema needs: tables, vectors of tables,
//! strings, inline structs and 32-bit scalars. Every offset followed is
//! bounds-checked against the buffer, so a corrupt file surfaces as a
//! [`FormatError`] instead of a panic.

use byteorder::{ByteOrder, LittleEndian};

use crate::FormatError;

type Result<T> = std::result::Result<T, FormatError>;

/// Size of a `uoffset_t`
const UOFFSET_SIZE: usize = 4;

/// Vtable header: `u16 vtable_len, u16 table_len`
const VTABLE_HEADER_SIZE: usize = 4;

fn slice<'a>(buf: &'a [u8], offset: usize, len: usize, what: &'static str) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .map(|end| &buf[offset..end])
        .ok_or(FormatError::OutOfBounds {
            what,
            offset,
            len: buf.len(),
        })
}

fn read_u16(buf: &[u8], offset: usize, what: &'static str) -> Result<u16> {
    slice(buf, offset, 2, what).map(LittleEndian::read_u16)
}

fn read_u32(buf: &[u8], offset: usize, what: &'static str) -> Result<u32> {
    slice(buf, offset, 4, what).map(LittleEndian::read_u32)
}

fn read_i32(buf: &[u8], offset: usize, what: &'static str) -> Result<i32> {
    slice(buf, offset, 4, what).map(LittleEndian::read_i32)
}

/// Follow the `uoffset_t` stored at `offset`
fn follow(buf: &[u8], offset: usize, what: &'static str) -> Result<usize> {
    let rel = read_u32(buf, offset, what)? as usize;
    offset
        .checked_add(rel)
        .filter(|&target| target < buf.len())
        .ok_or(FormatError::OutOfBounds {
            what,
            offset: offset.saturating_add(rel),
            len: buf.len(),
        })
}

/// Resolve the root table of a finished buffer
pub fn root(buf: &[u8]) -> Result<Table<'_>> {
    if buf.len() < UOFFSET_SIZE {
        return Err(FormatError::TooShort {
            needed: UOFFSET_SIZE,
            actual: buf.len(),
        });
    }

    let pos = follow(buf, 0, "root table")?;
    Table::at(buf, pos, "root table")
}

/// A flatbuffer table: a position in the buffer plus its vtable
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    buf: &'a [u8],
    pos: usize,
    vtable: usize,
    vtable_len: usize,
}

impl<'a> Table<'a> {
    /// Read the table at `pos`, validating its vtable
    pub fn at(buf: &'a [u8], pos: usize, what: &'static str) -> Result<Self> {
        let soffset = read_i32(buf, pos, what)? as i64;
        let vtable = pos as i64 - soffset;
        if vtable < 0 || vtable as usize + VTABLE_HEADER_SIZE > buf.len() {
            return Err(FormatError::OutOfBounds {
                what: "vtable",
                offset: vtable.max(0) as usize,
                len: buf.len(),
            });
        }

        let vtable = vtable as usize;
        let vtable_len = read_u16(buf, vtable, "vtable")? as usize;
        if vtable_len < VTABLE_HEADER_SIZE {
            return Err(FormatError::OutOfBounds {
                what: "vtable",
                offset: vtable,
                len: buf.len(),
            });
        }
        slice(buf, vtable, vtable_len, "vtable")?;

        Ok(Self {
            buf,
            pos,
            vtable,
            vtable_len,
        })
    }

    /// Absolute position of a field, or `None` when absent
    fn field(&self, slot: usize) -> Result<Option<usize>> {
        let entry = VTABLE_HEADER_SIZE + slot * 2;
        if entry + 2 > self.vtable_len {
            return Ok(None);
        }

        match read_u16(self.buf, self.vtable + entry, "vtable entry")? {
            0 => Ok(None),
            rel => Ok(Some(self.pos + rel as usize)),
        }
    }

    pub fn i32(&self, slot: usize, what: &'static str) -> Result<i32> {
        match self.field(slot)? {
            Some(at) => read_i32(self.buf, at, what),
            None => Ok(0),
        }
    }

    pub fn bool(&self, slot: usize, what: &'static str) -> Result<bool> {
        match self.field(slot)? {
            Some(at) => slice(self.buf, at, 1, what).map(|b| b[0] != 0),
            None => Ok(false),
        }
    }

    /// Inline struct bytes
    pub fn struct_bytes(
        &self,
        slot: usize,
        size: usize,
        what: &'static str,
    ) -> Result<Option<&'a [u8]>> {
        self.field(slot)?
            .map(|at| slice(self.buf, at, size, what))
            .transpose()
    }

    pub fn string(&self, slot: usize, what: &'static str) -> Result<Option<&'a str>> {
        let Some(at) = self.field(slot)? else {
            return Ok(None);
        };

        let start = follow(self.buf, at, what)?;
        let len = read_u32(self.buf, start, what)? as usize;
        let bytes = slice(self.buf, start + UOFFSET_SIZE, len, what)?;

        std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|_| FormatError::InvalidUtf8 { offset: start })
    }

    pub fn table(&self, slot: usize, what: &'static str) -> Result<Option<Table<'a>>> {
        let Some(at) = self.field(slot)? else {
            return Ok(None);
        };

        let pos = follow(self.buf, at, what)?;
        Table::at(self.buf, pos, what).map(Some)
    }

    /// Vector of tables; an absent vector reads as empty
    pub fn vector(&self, slot: usize, what: &'static str) -> Result<Vector<'a>> {
        let Some(at) = self.field(slot)? else {
            return Ok(Vector {
                buf: self.buf,
                start: 0,
                len: 0,
                what,
            });
        };

        let start = follow(self.buf, at, what)?;
        let len = read_u32(self.buf, start, what)? as usize;
        let elements = len.checked_mul(UOFFSET_SIZE).ok_or(FormatError::OutOfBounds {
            what,
            offset: start,
            len: self.buf.len(),
        })?;
        slice(self.buf, start + UOFFSET_SIZE, elements, what)?;

        Ok(Vector {
            buf: self.buf,
            start: start + UOFFSET_SIZE,
            len,
            what,
        })
    }
}

/// Vector of table offsets
#[derive(Debug, Clone, Copy)]
pub struct Vector<'a> {
    buf: &'a [u8],
    start: usize,
    len: usize,
    what: &'static str,
}

impl<'a> Vector<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn table(&self, index: usize) -> Result<Table<'a>> {
        if index >= self.len {
            return Err(FormatError::IndexOutOfRange {
                what: self.what,
                index,
                len: self.len,
            });
        }

        let at = self.start + index * UOFFSET_SIZE;
        let pos = follow(self.buf, at, self.what)?;
        Table::at(self.buf, pos, self.what)
    }
}
