//! Containers that hold lumps.  Only the wad format exists so far.

pub mod wad;
