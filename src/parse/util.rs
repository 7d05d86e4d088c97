use nom::{self, IResult};

use name::Name;


// Names are stored as raw bytes; anything goes, since real wads are full of lowercase and
// punctuation that vanilla would have choked on.
named!(pub name_field<Name>, map!(take!(8), Name::from_bytes));

/// Succeeds only on empty input.  nom's own `eof!` treats a bare byte slice as a stream that
/// might still grow, so it never matches on one.
pub fn naive_eof(input: &[u8]) -> IResult<&[u8], ()> {
    if input.is_empty() {
        Ok((input, ()))
    }
    else {
        Err(nom::Err::Error(nom::Context::Code(input, nom::ErrorKind::Eof)))
    }
}


#[cfg(test)]
mod tests {
    use super::{naive_eof, name_field};
    use name::Name;

    #[test]
    fn reads_exactly_eight_bytes() {
        let (rest, name) = name_field(b"STARTAN3xyz").unwrap();
        assert_eq!(name, Name::new("STARTAN3"));
        assert_eq!(rest, b"xyz");
    }

    #[test]
    fn short_input_is_incomplete() {
        assert!(name_field(b"SKY1").is_err());
    }

    #[test]
    fn eof_matches_only_the_end() {
        assert!(naive_eof(b"").is_ok());
        assert!(naive_eof(b"1").is_err());
    }
}
