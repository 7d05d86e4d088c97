use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use nom::{IResult, le_i16, le_u16};

use super::util::name_field;
use ::errors::Result;
use ::name::Name;


/// A fixed-size record from one of the map lumps.
pub trait Record: Sized {
    /// Size of one record on disk, in bytes
    const SIZE: usize;
    /// Name of the lump these records live in, for error messages
    const LUMP: &'static str;

    fn parse(input: &[u8]) -> IResult<&[u8], Self>;
    fn write_to(&self, writer: &mut Write) -> Result<()>;
}

/// Serializes a whole lump's worth of records.
pub fn write_records<R: Record>(records: &[R]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(records.len() * R::SIZE);
    for record in records {
        record.write_to(&mut buf)?;
    }
    Ok(buf)
}

fn write_name(writer: &mut Write, name: &Name) -> Result<()> {
    writer.write_all(&name.raw())?;
    Ok(())
}


bitflags! {
    pub struct ThingFlags: u16 {
        const EASY = 0x0001;
        const MEDIUM = 0x0002;
        const HARD = 0x0004;
        const AMBUSH = 0x0008;
        const MULTIPLAYER_ONLY = 0x0010;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BareThing {
    pub x: i16,
    pub y: i16,
    /// Facing, in degrees; 0 is east and 90 is north
    pub angle: i16,
    pub doomednum: i16,
    pub flags: ThingFlags,
}

named!(thing_record<BareThing>, do_parse!(
    x: le_i16 >>
    y: le_i16 >>
    angle: le_i16 >>
    doomednum: le_i16 >>
    // Boom and MBF added more flags; only the vanilla ones survive
    flags: map!(le_u16, ThingFlags::from_bits_truncate) >>
    (BareThing{ x, y, angle, doomednum, flags })
));

impl Record for BareThing {
    const SIZE: usize = 10;
    const LUMP: &'static str = "THINGS";

    fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        thing_record(input)
    }

    fn write_to(&self, writer: &mut Write) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.x)?;
        writer.write_i16::<LittleEndian>(self.y)?;
        writer.write_i16::<LittleEndian>(self.angle)?;
        writer.write_i16::<LittleEndian>(self.doomednum)?;
        writer.write_u16::<LittleEndian>(self.flags.bits())?;
        Ok(())
    }
}


bitflags! {
    pub struct LineFlags: u16 {
        const BLOCKING = 0x0001;
        const BLOCK_MONSTERS = 0x0002;
        const TWO_SIDED = 0x0004;
        const UPPER_UNPEGGED = 0x0008;
        const LOWER_UNPEGGED = 0x0010;
        const SECRET = 0x0020;
        const BLOCK_SOUND = 0x0040;
        const HIDDEN = 0x0080;
        const MAPPED = 0x0100;
    }
}

/// Sidedef index that means "no side here".
const NO_SIDEDEF: u16 = 0xFFFF;

// Vanilla treats the indices as signed, but no real map has a negative one, and source ports
// read them as unsigned to get past 32767.  The one exception is the -1 sentinel.
#[derive(Clone, Debug, PartialEq)]
pub struct BareLine {
    pub v0: u16,
    pub v1: u16,
    pub flags: LineFlags,
    pub special: i16,
    pub sector_tag: i16,
    pub front_sidedef: u16,
    pub back_sidedef: Option<u16>,
}

impl BareLine {
    /// Only lines with both a back side and the flag get two-sided treatment.
    pub fn is_two_sided(&self) -> bool {
        self.back_sidedef.is_some() && self.flags.contains(LineFlags::TWO_SIDED)
    }
}

fn optional_side(index: u16) -> Option<u16> {
    if index == NO_SIDEDEF { None } else { Some(index) }
}

named!(line_record<BareLine>, do_parse!(
    v0: le_u16 >>
    v1: le_u16 >>
    flags: map!(le_u16, LineFlags::from_bits_truncate) >>
    special: le_i16 >>
    sector_tag: le_i16 >>
    front_sidedef: le_u16 >>
    back_sidedef: map!(le_u16, optional_side) >>
    (BareLine{ v0, v1, flags, special, sector_tag, front_sidedef, back_sidedef })
));

impl Record for BareLine {
    const SIZE: usize = 14;
    const LUMP: &'static str = "LINEDEFS";

    fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        line_record(input)
    }

    fn write_to(&self, writer: &mut Write) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.v0)?;
        writer.write_u16::<LittleEndian>(self.v1)?;
        writer.write_u16::<LittleEndian>(self.flags.bits())?;
        writer.write_i16::<LittleEndian>(self.special)?;
        writer.write_i16::<LittleEndian>(self.sector_tag)?;
        writer.write_u16::<LittleEndian>(self.front_sidedef)?;
        writer.write_u16::<LittleEndian>(self.back_sidedef.unwrap_or(NO_SIDEDEF))?;
        Ok(())
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct BareSide {
    pub x_offset: i16,
    pub y_offset: i16,
    pub upper_texture: Name,
    pub lower_texture: Name,
    pub middle_texture: Name,
    pub sector: u16,
}

named!(side_record<BareSide>, do_parse!(
    x_offset: le_i16 >>
    y_offset: le_i16 >>
    upper_texture: name_field >>
    lower_texture: name_field >>
    middle_texture: name_field >>
    sector: le_u16 >>
    (BareSide{
        x_offset,
        y_offset,
        upper_texture,
        lower_texture,
        middle_texture,
        sector
    })
));

impl Record for BareSide {
    const SIZE: usize = 30;
    const LUMP: &'static str = "SIDEDEFS";

    fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        side_record(input)
    }

    fn write_to(&self, writer: &mut Write) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.x_offset)?;
        writer.write_i16::<LittleEndian>(self.y_offset)?;
        write_name(writer, &self.upper_texture)?;
        write_name(writer, &self.lower_texture)?;
        write_name(writer, &self.middle_texture)?;
        writer.write_u16::<LittleEndian>(self.sector)?;
        Ok(())
    }
}


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BareVertex {
    pub x: i16,
    pub y: i16,
}

named!(vertex_record<BareVertex>, do_parse!(
    x: le_i16 >>
    y: le_i16 >>
    (BareVertex{ x, y })
));

impl Record for BareVertex {
    const SIZE: usize = 4;
    const LUMP: &'static str = "VERTEXES";

    fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        vertex_record(input)
    }

    fn write_to(&self, writer: &mut Write) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.x)?;
        writer.write_i16::<LittleEndian>(self.y)?;
        Ok(())
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct BareSector {
    pub floor_height: i16,
    pub ceiling_height: i16,
    pub floor_texture: Name,
    pub ceiling_texture: Name,
    pub light: i16,
    pub sector_type: i16,
    pub sector_tag: i16,
}

impl BareSector {
    /// A sector whose floor and ceiling meet can't have any walls.
    pub fn is_degenerate(&self) -> bool {
        self.floor_height == self.ceiling_height
    }
}

named!(sector_record<BareSector>, do_parse!(
    floor_height: le_i16 >>
    ceiling_height: le_i16 >>
    floor_texture: name_field >>
    ceiling_texture: name_field >>
    light: le_i16 >>
    sector_type: le_i16 >>
    sector_tag: le_i16 >>
    (BareSector{
        floor_height,
        ceiling_height,
        floor_texture,
        ceiling_texture,
        light,
        sector_type,
        sector_tag,
    })
));

impl Record for BareSector {
    const SIZE: usize = 26;
    const LUMP: &'static str = "SECTORS";

    fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        sector_record(input)
    }

    fn write_to(&self, writer: &mut Write) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.floor_height)?;
        writer.write_i16::<LittleEndian>(self.ceiling_height)?;
        write_name(writer, &self.floor_texture)?;
        write_name(writer, &self.ceiling_texture)?;
        writer.write_i16::<LittleEndian>(self.light)?;
        writer.write_i16::<LittleEndian>(self.sector_type)?;
        writer.write_i16::<LittleEndian>(self.sector_tag)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use name::Name;

    #[test]
    fn line_without_back_side() {
        let bytes = [
            1, 0,  2, 0,  0x14, 0,  0, 0,  7, 0,  3, 0,  0xFF, 0xFF,
        ];
        let (rest, line) = BareLine::parse(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(line.v0, 1);
        assert_eq!(line.v1, 2);
        assert_eq!(line.flags, LineFlags::TWO_SIDED | LineFlags::LOWER_UNPEGGED);
        assert_eq!(line.sector_tag, 7);
        assert_eq!(line.front_sidedef, 3);
        assert_eq!(line.back_sidedef, None);
        // The flag alone isn't enough
        assert!(!line.is_two_sided());
    }

    #[test]
    fn unknown_line_flags_are_dropped() {
        let line = BareLine{
            v0: 0, v1: 1,
            flags: LineFlags::from_bits_truncate(0x8004),
            special: 0, sector_tag: 0,
            front_sidedef: 0, back_sidedef: Some(1),
        };
        assert_eq!(line.flags, LineFlags::TWO_SIDED);
        assert!(line.is_two_sided());
    }

    #[test]
    fn sides_keep_their_texture_names() {
        let side = BareSide{
            x_offset: -8,
            y_offset: 16,
            upper_texture: Name::new("STARTAN3"),
            lower_texture: Name::new("-"),
            middle_texture: Name::new("door3"),
            sector: 12,
        };
        let bytes = write_records(&[side.clone()]).unwrap();
        assert_eq!(bytes.len(), BareSide::SIZE);
        assert_eq!(&bytes[4..12], b"STARTAN3");
        assert_eq!(&bytes[12..20], b"-\0\0\0\0\0\0\0");

        let (_, parsed) = BareSide::parse(&bytes).unwrap();
        assert_eq!(parsed, side);
        assert_eq!(parsed.middle_texture, Name::new("DOOR3"));
    }

    #[test]
    fn record_sizes_match_what_the_writers_produce() {
        let thing = BareThing{ x: 1, y: 2, angle: 90, doomednum: 3004, flags: ThingFlags::AMBUSH };
        assert_eq!(write_records(&[thing]).unwrap().len(), BareThing::SIZE);
        let vertex = BareVertex{ x: -32768, y: 32767 };
        assert_eq!(write_records(&[vertex]).unwrap().len(), BareVertex::SIZE);
        let sector = BareSector{
            floor_height: 0,
            ceiling_height: 0,
            floor_texture: Name::new("FLOOR4_8"),
            ceiling_texture: Name::new("CEIL3_5"),
            light: 160,
            sector_type: 0,
            sector_tag: 0,
        };
        assert!(sector.is_degenerate());
        assert_eq!(write_records(&[sector]).unwrap().len(), BareSector::SIZE);
    }

    #[test]
    fn short_record_is_incomplete() {
        match BareVertex::parse(&[1, 0, 2]) {
            Err(::nom::Err::Incomplete(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
