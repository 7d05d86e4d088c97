use std::cmp;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An eight-byte lump, texture, or flat name.
///
/// Names are zero-padded but not necessarily zero-terminated: an eight-character name fills
/// the whole field.  Comparison and formatting stop at the first NUL or at the end of the
/// field, and comparison ignores ASCII case, which is how the engine itself treats them.
#[derive(Copy, Clone, Default)]
pub struct Name([u8; 8]);

impl Name {
    /// Builds a name from raw bytes.  Anything past eight bytes is ignored; anything short of
    /// eight is padded with zeroes.
    pub fn from_bytes(bytes: &[u8]) -> Name {
        let mut raw = [0; 8];
        let len = cmp::min(bytes.len(), 8);
        raw[..len].copy_from_slice(&bytes[..len]);
        Name(raw)
    }

    pub fn new(name: &str) -> Name {
        Name::from_bytes(name.as_bytes())
    }

    /// The full padded field, as it would be written to a wad.
    pub fn raw(&self) -> [u8; 8] {
        self.0
    }

    /// The meaningful part of the name: everything before the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        &self.0[..len]
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// True for the `-` placeholder that sidedefs use to mean "no texture here".  Empty names
    /// are treated the same way, since there is nothing they could resolve to.
    pub fn is_absent(&self) -> bool {
        self.as_bytes() == b"-" || self.is_empty()
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        let bytes = self.as_bytes();
        bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Name) -> bool {
        self.as_bytes().eq_ignore_ascii_case(other.as_bytes())
    }
}

impl Eq for Name {}

impl<'a> PartialEq<&'a str> for Name {
    fn eq(&self, other: &&'a str) -> bool {
        other.len() <= 8 && self.as_bytes().eq_ignore_ascii_case(other.as_bytes())
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.as_bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

impl<'a> From<&'a str> for Name {
    fn from(name: &'a str) -> Name {
        Name::new(name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &b in self.as_bytes() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            }
            else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({:?})", self.to_string())
    }
}


/// The vanilla map slots: `ExMy` for Doom and `MAPxx` for Doom II.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapName {
    ExMy(u8, u8),
    MAPxx(u8),
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MapName::ExMy(e, m) => write!(f, "E{}M{}", e, m),
            MapName::MAPxx(xx) => write!(f, "MAP{:02}", xx),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{MapName, Name};

    #[test]
    fn equality_ignores_case_and_padding() {
        assert_eq!(Name::from_bytes(b"MYTEX\0\0\0"), Name::from_bytes(b"mytex\0\0\0"));
        assert_eq!(Name::from_bytes(b"MYTEX\0ab"), Name::from_bytes(b"MYTEX\0\0\0"));
        assert_eq!(Name::from_bytes(b"STARTAN3"), Name::new("startan3"));
    }

    #[test]
    fn equality_checks_all_eight_bytes() {
        assert!(Name::from_bytes(b"AAAAAAAA") != Name::from_bytes(b"AAAAAAAB"));
        assert!(Name::new("STEP") != Name::new("STEP1"));
    }

    #[test]
    fn long_input_is_cut_at_eight() {
        let name = Name::new("BIGDOOR12345");
        assert_eq!(name.as_bytes(), b"BIGDOOR1");
        assert_eq!(name.to_string(), "BIGDOOR1");
    }

    #[test]
    fn hashing_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(Name::new("flat5_4"));
        assert!(set.contains(&Name::new("FLAT5_4")));
    }

    #[test]
    fn absent_sentinel() {
        assert!(Name::new("-").is_absent());
        assert!(Name::default().is_absent());
        assert!(!Name::new("-X").is_absent());
        assert!(!Name::new("DOOR3").is_absent());
    }

    #[test]
    fn map_names_format_like_the_game() {
        assert_eq!(MapName::ExMy(1, 3).to_string(), "E1M3");
        assert_eq!(MapName::MAPxx(7).to_string(), "MAP07");
    }

    #[test]
    fn compares_against_str() {
        assert!(Name::new("Things") == "THINGS");
        assert!(Name::new("E1M1").starts_with(b"e1"));
    }
}
