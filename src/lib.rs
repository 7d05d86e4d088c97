//! Rebuilds renderable level geometry from Doom wads.
//!
//! The pipeline runs over one immutable byte buffer: the wad directory is parsed, a map's
//! records are read through bounds-checked views, walls and sector flats are generated, and
//! every referenced texture is composited from its patches.  The result is a `map::Map` that
//! an exporter can serialize however it likes.

#[macro_use]
extern crate bitflags;
extern crate byteorder;
extern crate earcutr;
#[macro_use]
extern crate error_chain;
extern crate euclid;
#[macro_use]
extern crate log;
extern crate memmap;
#[macro_use]
extern crate nom;

#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod archive;
pub mod convert;
pub mod errors;
pub mod geom;
pub mod map;
pub mod name;
pub mod palette;
pub mod parse;
pub mod polygon;
pub mod raw_buffer;
pub mod texture;
pub mod universe;
pub mod view;
pub mod walls;

pub use archive::wad::{BareWAD, BareWADDirectoryEntry, WADBuilder, WADMapEntryBlock, WADType};
pub use convert::{convert_map, ExtractionOptions};
pub use map::{Diagnostic, Map};
pub use name::Name;
pub use palette::ColorResolver;
pub use parse::map::{BareLine, BareSector, BareSide, BareThing, BareVertex, LineFlags, Record, ThingFlags};
pub use parse::texturex::{parse_pnames, TextureDefinition};
pub use parse::wad::parse_wad;
