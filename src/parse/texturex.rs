use nom::{le_i16, le_i32, le_u16};

use super::util::name_field;
use ::errors::{ErrorKind, Result, nom_to_result};
use ::name::Name;


/// Where one patch goes on a composite texture's canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchPlacement {
    pub origin_x: i16,
    pub origin_y: i16,
    /// Index into PNAMES
    pub patch: u16,
}

/// One entry from TEXTURE1 or TEXTURE2.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDefinition {
    pub name: Name,
    pub width: u16,
    pub height: u16,
    pub patches: Vec<PatchPlacement>,
}

named!(texturex_lump_header<Vec<i32>>, do_parse!(
    numtextures: verify!(le_i32, |n: i32| n >= 0) >>
    offsets: count!(le_i32, numtextures as usize) >>
    (offsets)
));

named!(patch_placement<PatchPlacement>, do_parse!(
    origin_x: le_i16 >>
    origin_y: le_i16 >>
    patch: le_u16 >>
    le_i16 >>  // "stepdir", unused
    le_i16 >>  // "colormap", unused
    (PatchPlacement{ origin_x, origin_y, patch })
));

named!(texturex_lump_entry<TextureDefinition>, do_parse!(
    name: name_field >>
    le_i32 >>  // "masked", unused
    width: le_u16 >>
    height: le_u16 >>
    le_i32 >>  // "columndirectory", unused
    patchcount: verify!(le_i16, |n: i16| n >= 0) >>
    patches: count!(patch_placement, patchcount as usize) >>
    (TextureDefinition{
        name,
        width,
        height,
        patches,
    })
));

fn entry_at(buf: &[u8], index: usize, offset: i32) -> Result<&[u8]> {
    if offset < 0 {
        bail!(ErrorKind::RecordOutOfRange("TEXTUREx", index));
    }
    match buf.get(offset as usize ..) {
        Some(entry) => Ok(entry),
        None => bail!(ErrorKind::TruncatedData("TEXTUREx entry")),
    }
}

/// Decodes every definition in a TEXTURE1 or TEXTURE2 lump.
pub fn parse_texturex(buf: &[u8]) -> Result<Vec<TextureDefinition>> {
    let offsets = nom_to_result("TEXTUREx header", texturex_lump_header(buf))?;
    let mut ret = Vec::with_capacity(offsets.len());
    for (i, &offset) in offsets.iter().enumerate() {
        let entry = entry_at(buf, i, offset)?;
        ret.push(nom_to_result("TEXTUREx entry", texturex_lump_entry(entry))?);
    }
    Ok(ret)
}

/// Linear search for one definition.  Only the matching entry is decoded in full.
pub fn find_texture_definition(buf: &[u8], name: &Name) -> Result<Option<TextureDefinition>> {
    let offsets = nom_to_result("TEXTUREx header", texturex_lump_header(buf))?;
    for (i, &offset) in offsets.iter().enumerate() {
        let entry = entry_at(buf, i, offset)?;
        let entry_name = nom_to_result("TEXTUREx entry", name_field(entry))?;
        if entry_name == *name {
            return Ok(Some(nom_to_result("TEXTUREx entry", texturex_lump_entry(entry))?));
        }
    }
    Ok(None)
}


named!(pnames_lump<Vec<Name>>, do_parse!(
    nummappatches: verify!(le_i32, |n: i32| n >= 0) >>
    names: count!(name_field, nummappatches as usize) >>
    (names)
));

/// Decodes the PNAMES lump: the patch names that texture definitions refer to by index.
pub fn parse_pnames(buf: &[u8]) -> Result<Vec<Name>> {
    nom_to_result("PNAMES", pnames_lump(buf))
}


#[cfg(test)]
pub mod tests {
    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;

    /// Builds a TEXTUREx lump, for tests here and elsewhere.
    pub fn texturex_bytes(definitions: &[TextureDefinition]) -> Vec<u8> {
        let mut entries = Vec::new();
        let mut offsets = Vec::new();
        let table_len = 4 + 4 * definitions.len();
        for def in definitions {
            offsets.push((table_len + entries.len()) as i32);
            entries.extend_from_slice(&def.name.raw());
            entries.write_i32::<LittleEndian>(0).unwrap();
            entries.write_u16::<LittleEndian>(def.width).unwrap();
            entries.write_u16::<LittleEndian>(def.height).unwrap();
            entries.write_i32::<LittleEndian>(0).unwrap();
            entries.write_i16::<LittleEndian>(def.patches.len() as i16).unwrap();
            for placement in &def.patches {
                entries.write_i16::<LittleEndian>(placement.origin_x).unwrap();
                entries.write_i16::<LittleEndian>(placement.origin_y).unwrap();
                entries.write_u16::<LittleEndian>(placement.patch).unwrap();
                entries.write_i16::<LittleEndian>(1).unwrap();
                entries.write_i16::<LittleEndian>(0).unwrap();
            }
        }

        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(definitions.len() as i32).unwrap();
        for offset in offsets {
            buf.write_i32::<LittleEndian>(offset).unwrap();
        }
        buf.extend(entries);
        buf
    }

    pub fn pnames_bytes(names: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(names.len() as i32).unwrap();
        for name in names {
            buf.extend_from_slice(&Name::new(name).raw());
        }
        buf
    }

    fn sample_definitions() -> Vec<TextureDefinition> {
        vec![
            TextureDefinition{
                name: Name::new("STARTAN3"),
                width: 128,
                height: 128,
                patches: vec![
                    PatchPlacement{ origin_x: 0, origin_y: 0, patch: 0 },
                    PatchPlacement{ origin_x: 64, origin_y: -8, patch: 1 },
                ],
            },
            TextureDefinition{
                name: Name::new("DOOR3"),
                width: 64,
                height: 72,
                patches: vec![PatchPlacement{ origin_x: 0, origin_y: 0, patch: 2 }],
            },
        ]
    }

    #[test]
    fn parses_every_definition() {
        let defs = sample_definitions();
        assert_eq!(parse_texturex(&texturex_bytes(&defs)).unwrap(), defs);
    }

    #[test]
    fn finds_one_by_name() {
        let buf = texturex_bytes(&sample_definitions());
        let found = find_texture_definition(&buf, &Name::new("door3")).unwrap().unwrap();
        assert_eq!(found.width, 64);
        assert_eq!(found.patches.len(), 1);
        assert_eq!(find_texture_definition(&buf, &Name::new("SKY1")).unwrap(), None);
    }

    #[test]
    fn offsets_past_the_end_are_errors() {
        let mut buf = texturex_bytes(&sample_definitions());
        buf[4] = 0xF0;
        buf[5] = 0x7F;
        assert!(parse_texturex(&buf).is_err());
    }

    #[test]
    fn reads_pnames() {
        let names = parse_pnames(&pnames_bytes(&["WALL00_3", "w13_1", "DOOR2_4"])).unwrap();
        assert_eq!(names, vec![Name::new("WALL00_3"), Name::new("W13_1"), Name::new("DOOR2_4")]);
        assert!(parse_pnames(&[3, 0, 0, 0, b'A']).is_err());
    }
}
