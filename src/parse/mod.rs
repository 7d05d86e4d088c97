pub mod map;
pub mod patch;
pub mod texturex;
pub mod wad;

mod util;

pub use self::wad::parse_wad;

use std::str::{self, FromStr};
use std::u8;

use nom::{is_digit, le_u8};

use ::name::{MapName, Name};
use self::util::naive_eof;


// Map name parsing -- doesn't clearly belong anywhere in particular

named!(exmy_map_name<MapName>, do_parse!(
    tag!(b"E") >>
    e: verify!(le_u8, is_digit) >>
    tag!(b"M") >>
    m: verify!(le_u8, is_digit) >>
    naive_eof >>
    (MapName::ExMy(e - b'0', m - b'0'))
));

named!(mapxx_map_name<MapName>, do_parse!(
    tag!(b"MAP") >>
    xx: verify!(
        map_res!(
            map_res!(
                take!(2),
                str::from_utf8
            ),
            u8::from_str
        ),
        |v| v >= 1 && v <= 99
    ) >>
    naive_eof >>
    (MapName::MAPxx(xx))
));

named!(vanilla_map_name<MapName>, alt!(exmy_map_name | mapxx_map_name));

/// Recognizes lump names that mark the start of a map, ignoring case.
pub fn parse_map_name(name: &Name) -> Option<MapName> {
    let upper = name.as_bytes().to_ascii_uppercase();
    vanilla_map_name(&upper).ok().map(|(_, map_name)| map_name)
}


#[cfg(test)]
mod tests {
    use super::parse_map_name;
    use name::{MapName, Name};

    #[test]
    fn recognizes_both_slot_styles() {
        assert_eq!(parse_map_name(&Name::new("E2M7")), Some(MapName::ExMy(2, 7)));
        assert_eq!(parse_map_name(&Name::new("map12")), Some(MapName::MAPxx(12)));
    }

    #[test]
    fn rejects_other_lumps() {
        assert_eq!(parse_map_name(&Name::new("THINGS")), None);
        assert_eq!(parse_map_name(&Name::new("E1M1X")), None);
        assert_eq!(parse_map_name(&Name::new("MAP00")), None);
    }
}
