//! Bounds-checked access to the fixed-size records of a map.
//!
//! Nothing is decoded up front.  A view is just a lump slice and a record count; each `get`
//! checks the index and parses that one record.

use std::marker::PhantomData;

use ::archive::wad::{BareWAD, WADMapEntryBlock};
use ::errors::{ErrorKind, Result, nom_to_result};
use ::parse::map::{BareLine, BareSector, BareSide, BareThing, BareVertex, Record};


pub struct RecordView<'a, R: Record> {
    buf: &'a [u8],
    len: usize,
    marker: PhantomData<R>,
}

// Derived Clone/Copy would demand R: Copy
impl<'a, R: Record> Clone for RecordView<'a, R> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, R: Record> Copy for RecordView<'a, R> {}

impl<'a, R: Record> RecordView<'a, R> {
    /// Wraps a lump.  Trailing bytes that don't make up a whole record are ignored.
    pub fn new(buf: &'a [u8]) -> Self {
        let len = buf.len() / R::SIZE;
        if buf.len() % R::SIZE != 0 {
            debug!("{} lump has {} stray trailing bytes", R::LUMP, buf.len() % R::SIZE);
        }
        RecordView{
            buf,
            len,
            marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Result<R> {
        if index >= self.len {
            bail!(ErrorKind::RecordOutOfRange(R::LUMP, index));
        }
        let start = index * R::SIZE;
        nom_to_result(R::LUMP, R::parse(&self.buf[start .. start + R::SIZE]))
    }

    pub fn iter(&self) -> RecordIter<'a, R> {
        RecordIter{
            view: *self,
            next_index: 0,
        }
    }

    /// Decodes every record, stopping at the first failure.
    pub fn to_vec(&self) -> Result<Vec<R>> {
        self.iter().collect()
    }
}

pub struct RecordIter<'a, R: Record> {
    view: RecordView<'a, R>,
    next_index: usize,
}

impl<'a, R: Record> Iterator for RecordIter<'a, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.view.len {
            return None;
        }
        let record = self.view.get(self.next_index);
        self.next_index += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len - self.next_index;
        (remaining, Some(remaining))
    }
}


/// Views over the five record lumps of one map.
#[derive(Clone, Copy)]
pub struct MapView<'a> {
    pub things: RecordView<'a, BareThing>,
    pub lines: RecordView<'a, BareLine>,
    pub sides: RecordView<'a, BareSide>,
    pub vertices: RecordView<'a, BareVertex>,
    pub sectors: RecordView<'a, BareSector>,
}

impl<'a> MapView<'a> {
    pub fn new(wad: &BareWAD<'a>, block: &WADMapEntryBlock) -> Self {
        MapView{
            things: RecordView::new(wad.entry_slice(block.things_index)),
            lines: RecordView::new(wad.entry_slice(block.linedefs_index)),
            sides: RecordView::new(wad.entry_slice(block.sidedefs_index)),
            vertices: RecordView::new(wad.entry_slice(block.vertexes_index)),
            sectors: RecordView::new(wad.entry_slice(block.sectors_index)),
        }
    }
}
