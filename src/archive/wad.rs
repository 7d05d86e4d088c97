use std::iter::Enumerate;
use std::slice;

use byteorder::{ByteOrder, LittleEndian};

use ::errors::{ErrorKind, Result};
use ::name::{MapName, Name};
use ::parse::parse_map_name;


/// Type of the WAD.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WADType {
    /// full standalone game
    IWAD,
    /// patch wad, a small mod
    PWAD,
}

impl WADType {
    pub fn magic(&self) -> &'static [u8; 4] {
        match *self {
            WADType::IWAD => b"IWAD",
            WADType::PWAD => b"PWAD",
        }
    }
}


/// Low-level interface to a parsed WAD.  Every lump stays a slice of the original buffer.
pub struct BareWAD<'n> {
    pub buffer: &'n [u8],
    pub header: BareWADHeader,
    pub directory: Vec<BareWADDirectoryEntry>,
}

impl<'n> BareWAD<'n> {
    pub fn entry_slice(&self, index: usize) -> &'n [u8] {
        self.directory[index].extract_slice(self.buffer)
    }

    /// Index of the first lump with this name.
    pub fn find_entry<N: Into<Name>>(&self, name: N) -> Result<usize> {
        let name = name.into();
        match self.directory.iter().position(|entry| entry.name == name) {
            Some(index) => Ok(index),
            None => bail!(ErrorKind::LumpNotFound(name)),
        }
    }

    pub fn first_entry<N: Into<Name>>(&self, name: N) -> Option<&'n [u8]> {
        let name = name.into();
        self.directory.iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.extract_slice(self.buffer))
    }

    /// Finds a lump by name, but only looks inside `begin`..`end` marker pairs.  Namespaces
    /// can appear more than once (a PWAD adding flats, say), and every pair is searched.
    pub fn find_entry_between<N: Into<Name>>(&self, begin_marker: &str, end_marker: &str, name: N) -> Option<usize> {
        let name = name.into();
        self.iter_entries_between(begin_marker, end_marker)
        .find(|&(_, entry)| entry.name == name)
        .map(|(index, _)| index)
    }

    /// Like `find_entry_between`, but matches the first lump whose name starts with `prefix`.
    pub fn find_prefixed_entry_between(&self, begin_marker: &str, end_marker: &str, prefix: &[u8]) -> Option<usize> {
        self.iter_entries_between(begin_marker, end_marker)
        .find(|&(_, entry)| entry.name.starts_with(prefix))
        .map(|(index, _)| index)
    }

    pub fn iter_entries_between<'a>(&'a self, begin_marker: &str, end_marker: &str) -> BareWADBetweenIterator<'a> {
        BareWADBetweenIterator {
            entries: self.directory.iter().enumerate(),
            begin_marker: Name::new(begin_marker),
            end_marker: Name::new(end_marker),
            between_markers: false,
        }
    }

    /// Locates the lumps of the named map.  They must follow the marker in exactly the
    /// vanilla order; anything else means the map can't be read, although other maps in the
    /// same file may still be fine.
    pub fn map_block<N: Into<Name>>(&self, name: N) -> Result<WADMapEntryBlock> {
        let name = name.into();
        let marker_index = self.find_entry(name)?;
        self.map_block_at(marker_index)
    }

    fn map_block_at(&self, marker_index: usize) -> Result<WADMapEntryBlock> {
        let mut indices = [0; 8];
        for (offset, &lump_name) in MAP_LUMP_ORDER.iter().enumerate() {
            let index = marker_index + 1 + offset;
            match self.directory.get(index) {
                Some(entry) if entry.name == lump_name => {
                    indices[offset] = index;
                }
                Some(entry) => {
                    bail!(ErrorKind::LumpOrderMismatch(lump_name, entry.name));
                }
                None => {
                    bail!(ErrorKind::LumpNotFound(Name::new(lump_name)));
                }
            }
        }

        let marker = &self.directory[marker_index];
        Ok(WADMapEntryBlock{
            name: marker.name,
            map_name: parse_map_name(&marker.name),
            marker_index,
            things_index: indices[0],
            linedefs_index: indices[1],
            sidedefs_index: indices[2],
            vertexes_index: indices[3],
            segs_index: indices[4],
            ssectors_index: indices[5],
            nodes_index: indices[6],
            sectors_index: indices[7],
        })
    }

    /// Every vanilla-named map marker whose lumps are all present and in order.  Broken maps
    /// are logged and skipped.
    pub fn iter_maps<'a>(&'a self) -> impl Iterator<Item=WADMapEntryBlock> + 'a {
        self.directory.iter().enumerate()
        .filter(|&(_, entry)| parse_map_name(&entry.name).is_some())
        .filter_map(move |(index, entry)| {
            match self.map_block_at(index) {
                Ok(block) => Some(block),
                Err(err) => {
                    warn!("skipping map {}: {}", entry.name, err);
                    None
                }
            }
        })
    }
}

pub struct BareWADBetweenIterator<'wad> {
    entries: Enumerate<slice::Iter<'wad, BareWADDirectoryEntry>>,
    begin_marker: Name,
    end_marker: Name,
    between_markers: bool,
}

impl<'w> Iterator for BareWADBetweenIterator<'w> {
    type Item = (usize, &'w BareWADDirectoryEntry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, entry) = self.entries.next()?;

            if self.between_markers && entry.name == self.end_marker {
                self.between_markers = false;
            }
            else if ! self.between_markers && entry.name == self.begin_marker {
                self.between_markers = true;
            }
            else if self.between_markers {
                return Some((index, entry));
            }
        }
    }
}

#[derive(Debug)]
pub struct BareWADHeader {
    pub identification: WADType,
    pub numlumps: i32,
    pub infotableofs: i32,
}

#[derive(Clone, Debug)]
pub struct BareWADDirectoryEntry {
    pub filepos: u32,
    pub size: u32,
    pub name: Name,
}

impl BareWADDirectoryEntry {
    /// Extract the slice described by this entry from a buffer.
    pub fn extract_slice<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        let start = self.filepos as usize;
        let end = start + self.size as usize;
        &buf[start..end]
    }
}

// -----------------------------------------------------------------------------
// Map stuff

/// Lumps that must follow a map marker, in this order.
pub const MAP_LUMP_ORDER: [&str; 8] = [
    "THINGS",
    "LINEDEFS",
    "SIDEDEFS",
    "VERTEXES",
    "SEGS",
    "SSECTORS",
    "NODES",
    "SECTORS",
];

#[derive(Clone, Debug)]
pub struct WADMapEntryBlock {
    pub name: Name,
    /// Which vanilla slot this is, if the marker follows the `ExMy` or `MAPxx` pattern
    pub map_name: Option<MapName>,
    pub marker_index: usize,

    pub things_index: usize,
    pub linedefs_index: usize,
    pub sidedefs_index: usize,
    pub vertexes_index: usize,
    pub segs_index: usize,
    pub ssectors_index: usize,
    pub nodes_index: usize,
    pub sectors_index: usize,
}


// -----------------------------------------------------------------------------
// Writing

/// Assembles a wad in memory.  Lumps are laid out in the order they're added, right after
/// the header, and the directory goes at the end.
pub struct WADBuilder {
    wadtype: WADType,
    lumps: Vec<(Name, Vec<u8>)>,
}

impl WADBuilder {
    pub fn new(wadtype: WADType) -> Self {
        WADBuilder{
            wadtype,
            lumps: Vec::new(),
        }
    }

    pub fn add_lump<N: Into<Name>>(&mut self, name: N, data: Vec<u8>) -> &mut Self {
        self.lumps.push((name.into(), data));
        self
    }

    /// Adds an empty lump, like a map marker or `F_START`.
    pub fn add_marker<N: Into<Name>>(&mut self, name: N) -> &mut Self {
        self.add_lump(name, Vec::new())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let data_len: usize = self.lumps.iter().map(|&(_, ref data)| data.len()).sum();
        let mut buf = Vec::with_capacity(12 + data_len + 16 * self.lumps.len());

        buf.extend_from_slice(self.wadtype.magic());
        push_i32(&mut buf, self.lumps.len() as i32);
        push_i32(&mut buf, (12 + data_len) as i32);

        let mut filepos = 12;
        let mut directory = Vec::with_capacity(16 * self.lumps.len());
        for &(ref name, ref data) in &self.lumps {
            buf.extend_from_slice(data);
            push_i32(&mut directory, filepos as i32);
            push_i32(&mut directory, data.len() as i32);
            directory.extend_from_slice(&name.raw());
            filepos += data.len();
        }
        buf.extend_from_slice(&directory);
        buf
    }
}

fn push_i32(buf: &mut Vec<u8>, value: i32) {
    let mut bytes = [0; 4];
    LittleEndian::write_i32(&mut bytes, value);
    buf.extend_from_slice(&bytes);
}
