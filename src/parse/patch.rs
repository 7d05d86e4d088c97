use nom::{self, le_i16, le_u16, le_u32, le_u8};

use ::errors::{ErrorKind, Result, nom_to_result};


/// Marks the end of a column's list of posts.
const END_OF_COLUMN: u8 = 0xFF;

#[derive(Debug)]
pub struct PatchHeader {
    pub width: u16,
    pub height: u16,
    pub left_offset: i16,
    pub top_offset: i16,
    /// Byte offset of each column's first post, from the start of the lump
    pub column_offsets: Vec<u32>,
}

named!(patch_header<PatchHeader>, do_parse!(
    width: le_u16 >>
    height: le_u16 >>
    left_offset: le_i16 >>
    top_offset: le_i16 >>
    column_offsets: count!(le_u32, width as usize) >>
    (PatchHeader{ width, height, left_offset, top_offset, column_offsets })
));

pub fn parse_patch_header(lump: &[u8]) -> Result<PatchHeader> {
    nom_to_result("patch header", patch_header(lump))
}


/// One vertical run of opaque pixels.
#[derive(Debug, PartialEq)]
pub struct Post<'a> {
    pub row_start: u8,
    pub pixels: &'a [u8],
}

// The padding bytes on either side of the pixels are never drawn
named!(post<Post>, do_parse!(
    row_start: le_u8 >>
    length: le_u8 >>
    take!(1) >>
    pixels: take!(length) >>
    take!(1) >>
    (Post{ row_start, pixels })
));

/// Reads the posts of the column that starts at `offset` within the lump.
pub fn column_posts(lump: &[u8], offset: u32) -> Result<Vec<Post>> {
    let mut rest = match lump.get(offset as usize ..) {
        Some(rest) => rest,
        None => bail!(ErrorKind::TruncatedData("patch column")),
    };

    let mut posts = Vec::new();
    loop {
        match rest.first() {
            None => bail!(ErrorKind::TruncatedData("patch column")),
            Some(&END_OF_COLUMN) => break,
            Some(_) => {}
        }
        match post(rest) {
            Ok((leftovers, parsed)) => {
                posts.push(parsed);
                rest = leftovers;
            }
            Err(nom::Err::Incomplete(_)) => bail!(ErrorKind::TruncatedData("patch post")),
            Err(_) => bail!(ErrorKind::ParseError("patch post")),
        }
    }
    Ok(posts)
}


#[cfg(test)]
pub mod tests {
    use byteorder::{LittleEndian, WriteBytesExt};

    use super::{column_posts, parse_patch_header, Post};

    /// Encodes a patch from a list of `(row_start, pixels)` posts per column.
    pub fn patch_bytes(height: u16, columns: &[Vec<(u8, Vec<u8>)>]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u16::<LittleEndian>(columns.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(height).unwrap();
        buf.write_i16::<LittleEndian>(0).unwrap();
        buf.write_i16::<LittleEndian>(0).unwrap();

        let mut body = Vec::new();
        let body_start = 8 + 4 * columns.len();
        for column in columns {
            buf.write_u32::<LittleEndian>((body_start + body.len()) as u32).unwrap();
            for &(row_start, ref pixels) in column {
                body.push(row_start);
                body.push(pixels.len() as u8);
                body.push(0);
                body.extend_from_slice(pixels);
                body.push(0);
            }
            body.push(0xFF);
        }
        buf.extend(body);
        buf
    }

    #[test]
    fn reads_header_and_offsets() {
        let lump = [
            2, 0,  5, 0,  0xFE, 0xFF,  3, 0,
            16, 0, 0, 0,  17, 0, 0, 0,
            0xFF, 0xFF,
        ];
        let header = parse_patch_header(&lump).unwrap();
        assert_eq!((header.width, header.height), (2, 5));
        assert_eq!((header.left_offset, header.top_offset), (-2, 3));
        assert_eq!(header.column_offsets, vec![16, 17]);
    }

    #[test]
    fn header_with_missing_offsets_is_truncated() {
        assert!(parse_patch_header(&[4, 0, 4, 0, 0, 0, 0, 0, 8, 0, 0, 0]).is_err());
    }

    #[test]
    fn splits_column_into_posts() {
        let lump = [
            0, 2, 0, 10, 11, 0,
            5, 1, 0, 12, 0,
            0xFF,
        ];
        let posts = column_posts(&lump, 0).unwrap();
        assert_eq!(posts, vec![
            Post{ row_start: 0, pixels: &[10, 11] },
            Post{ row_start: 5, pixels: &[12] },
        ]);
    }

    #[test]
    fn test_encoder_round_trips_through_the_parser() {
        let lump = patch_bytes(4, &[vec![], vec![(1, vec![7, 8])]]);
        let header = parse_patch_header(&lump).unwrap();
        assert_eq!(header.width, 2);
        assert!(column_posts(&lump, header.column_offsets[0]).unwrap().is_empty());
        assert_eq!(column_posts(&lump, header.column_offsets[1]).unwrap(),
            vec![Post{ row_start: 1, pixels: &[7, 8] }]);
    }

    #[test]
    fn column_without_terminator_is_truncated() {
        assert!(column_posts(&[0, 2, 0, 10, 11, 0], 0).is_err());
        assert!(column_posts(&[0, 4, 0, 10, 11], 0).is_err());
        assert!(column_posts(&[0xFF], 7).is_err());
    }
}
