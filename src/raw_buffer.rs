use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use memmap::{Mmap, MmapOptions};

use errors::Result;

/// The bytes of a whole wad, never modified once loaded.
///
/// Either read into memory (from stdin, or built by hand) or mapped straight from a file.
/// Everything the converter produces either copies out of this or borrows from `bytes()`.
pub enum RawBuffer {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl RawBuffer {
    /// Reads all of stdin into memory.
    pub fn from_stdin() -> Result<RawBuffer> {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        debug!("read {} bytes from stdin", buf.len());

        Ok(RawBuffer::Owned(buf))
    }

    /// Maps a file into read-only memory.
    ///
    /// Empty files can't be mapped, so they come back as an empty owned buffer instead.
    pub fn from_file<P>(path: P) -> Result<RawBuffer>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref())?;
        if file.metadata()?.len() == 0 {
            return Ok(RawBuffer::Owned(Vec::new()));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        debug!("mapped {} bytes from {}", mmap.len(), path.as_ref().display());

        Ok(RawBuffer::Mapped(mmap))
    }

    pub fn from_vec(buf: Vec<u8>) -> RawBuffer {
        RawBuffer::Owned(buf)
    }

    pub fn bytes(&self) -> &[u8] {
        match *self {
            RawBuffer::Owned(ref v) => &*v,
            RawBuffer::Mapped(ref m) => &*m,
        }
    }
}


#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io::Write;

    use super::RawBuffer;

    #[test]
    fn mapped_and_owned_read_the_same() {
        let path = env::temp_dir().join(format!("wadmesh-raw-buffer-{}.wad", ::std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(b"PWAD\0\0\0\0\x0c\0\0\0").unwrap();
        }
        let mapped = RawBuffer::from_file(&path).unwrap();
        let owned = RawBuffer::from_vec(fs::read(&path).unwrap());
        fs::remove_file(&path).unwrap();

        assert_eq!(mapped.bytes(), owned.bytes());
        assert_eq!(&mapped.bytes()[..4], b"PWAD");
    }

    #[test]
    fn empty_file_is_an_empty_buffer() {
        let path = env::temp_dir().join(format!("wadmesh-raw-buffer-empty-{}.wad", ::std::process::id()));
        fs::File::create(&path).unwrap();
        let buffer = RawBuffer::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(buffer.bytes().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(RawBuffer::from_file("/nonexistent/wadmesh/test.wad").is_err());
    }
}
