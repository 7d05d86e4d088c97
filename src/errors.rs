use std::io;

use nom;

use name::Name;

error_chain! {
    foreign_links {
        Io(io::Error);
    }

    errors {
        ParseError(whence: &'static str) {
            description("nonspecific parse error")
            display("nonspecific parse error while parsing {}", whence)
        }
        TruncatedData(whence: &'static str) {
            description("unexpected end of input")
            display("unexpected end of input while parsing {}", whence)
        }
        MalformedContainer(reason: String) {
            description("malformed wad container")
            display("malformed wad container: {}", reason)
        }
        LumpNotFound(name: Name) {
            description("lump not found")
            display("could not find lump {}", name)
        }
        LumpOrderMismatch(expected: &'static str, found: Name) {
            description("map lumps out of order")
            display("expected map lump {}, found {}", expected, found)
        }
        TextureNotFound(name: Name) {
            description("texture not found")
            display("no TEXTURE1 or TEXTURE2 entry named {}", name)
        }
        RecordOutOfRange(lump: &'static str, index: usize) {
            description("record index out of range")
            display("{} has no record at index {}", lump, index)
        }
        TriangulationFailed(reason: String) {
            description("couldn't triangulate polygon")
            display("couldn't triangulate polygon: {}", reason)
        }
    }
}

/// Turns a finished nom parse into a `Result`, discarding any leftover input.
pub fn nom_to_result<I, O>(whence: &'static str, result: nom::IResult<I, O>) -> Result<O> {
    match result {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Incomplete(_)) => bail!(ErrorKind::TruncatedData(whence)),
        Err(_) => bail!(ErrorKind::ParseError(whence)),
    }
}
