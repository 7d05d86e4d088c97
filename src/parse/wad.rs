use nom::{self, le_i32};

use super::util::name_field;
use ::archive::wad::{BareWAD, BareWADDirectoryEntry, BareWADHeader, WADType};
use ::errors::{ErrorKind, Result};
use ::name::Name;

/// Size of one directory record: offset, length, name.
pub const DIRECTORY_ENTRY_SIZE: usize = 16;
const HEADER_SIZE: usize = 12;


named!(iwad_tag<WADType>, value!(WADType::IWAD, tag!(b"IWAD")));
named!(pwad_tag<WADType>, value!(WADType::PWAD, tag!(b"PWAD")));

named!(wad_header<BareWADHeader>, do_parse!(
    identification: return_error!(
        nom::ErrorKind::Custom(1),
        alt!(iwad_tag | pwad_tag)) >>
    numlumps: le_i32 >>
    infotableofs: le_i32 >>
    (BareWADHeader{ identification, numlumps, infotableofs })
));

named!(wad_entry<(i32, i32, Name)>, do_parse!(
    filepos: le_i32 >>
    size: le_i32 >>
    name: name_field >>
    ((filepos, size, name))
));


fn wad_directory(buf: &[u8], header: &BareWADHeader) -> Result<Vec<BareWADDirectoryEntry>> {
    if header.numlumps < 0 || header.infotableofs < 0 {
        bail!(ErrorKind::MalformedContainer(format!(
            "negative lump count {} or directory offset {}", header.numlumps, header.infotableofs)));
    }
    let lumpct = header.numlumps as usize;
    let offset = header.infotableofs as usize;
    let tablelen = lumpct * DIRECTORY_ENTRY_SIZE;
    if offset.checked_add(tablelen).map_or(true, |end| end > buf.len()) {
        bail!(ErrorKind::MalformedContainer(format!(
            "directory of {} lumps at offset {} runs past the end of a {}-byte file",
            lumpct, offset, buf.len())));
    }

    let mut ret = Vec::with_capacity(lumpct);
    let mut parse_from = &buf[offset..];
    for i in 0..lumpct {
        let (leftovers, (filepos, size, name)) = match wad_entry(parse_from) {
            Ok(parsed) => parsed,
            Err(_) => bail!(ErrorKind::TruncatedData("wad directory")),
        };
        if filepos < 0 || size < 0 || filepos as usize + size as usize > buf.len() {
            bail!(ErrorKind::MalformedContainer(format!(
                "lump {} ({}) spans {}+{}, outside a {}-byte file", i, name, filepos, size, buf.len())));
        }
        ret.push(BareWADDirectoryEntry{ filepos: filepos as u32, size: size as u32, name });
        parse_from = leftovers;
    }
    Ok(ret)
}


/// Parses the header and directory of a wad.  Lump payloads are left where they are; the
/// returned `BareWAD` only hands out slices of `buf`.
pub fn parse_wad(buf: &[u8]) -> Result<BareWAD> {
    if buf.len() < HEADER_SIZE {
        bail!(ErrorKind::MalformedContainer(format!("{} bytes is too short for a wad header", buf.len())));
    }
    // The length check above rules out Incomplete, so the magic is the only thing that can fail
    let header = match wad_header(buf) {
        Ok((_, header)) => header,
        Err(_) => bail!(ErrorKind::MalformedContainer("bad magic, expected IWAD or PWAD".to_owned())),
    };
    let directory = wad_directory(buf, &header)?;
    debug!("wad has {} lumps, directory at {}", directory.len(), header.infotableofs);
    Ok(BareWAD{ buffer: buf, header, directory })
}
