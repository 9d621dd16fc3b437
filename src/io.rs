//! Low-level byte-order helpers shared by every binary driver.
//!
//! Modeled on the original source's `readValue<T>` template plus a runtime
//! [`Endian`] switch, since Selafin's byte order is only known after probing
//! the file (see `driver::selafin`) and can't be fixed at compile time the
//! way `byteorder`'s `BigEndian`/`LittleEndian` marker types expect.

use std::io::{self, Read, Write};
use std::sync::OnceLock;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// The byte order of a binary stream, resolved at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least-significant byte first.
    Little,
    /// Most-significant byte first.
    Big,
}

static NATIVE_LITTLE_ENDIAN: OnceLock<bool> = OnceLock::new();

/// Whether the running machine is little-endian, computed once and cached.
pub fn is_native_little_endian() -> bool {
    *NATIVE_LITTLE_ENDIAN.get_or_init(|| 1u16.to_le_bytes()[0] == 1u16.to_ne_bytes()[0])
}

impl Endian {
    /// The endianness of the machine this process runs on.
    pub fn native() -> Self {
        if is_native_little_endian() {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    /// The opposite of this endianness.
    pub fn swapped(self) -> Self {
        match self {
            Endian::Little => Endian::Big,
            Endian::Big => Endian::Little,
        }
    }
}

/// A cursor-style reader over an in-memory or file-backed stream whose byte
/// order is fixed once (at construction, or after a magic-byte probe) and
/// then used for every subsequent read.
///
/// Centralizes wire-format reads the way a single low-level module should,
/// rather than scattering `byteorder` calls across every driver.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    endian: Endian,
}

impl<R: Read> ByteReader<R> {
    /// Wraps `inner`, reading with the given byte order.
    pub fn new(inner: R, endian: Endian) -> Self {
        ByteReader { inner, endian }
    }

    /// The byte order this reader was constructed with.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Switches this reader to `endian` for all subsequent reads.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Reads a big/little-endian `u32` depending on [`ByteReader::endian`].
    pub fn read_u32(&mut self) -> io::Result<u32> {
        match self.endian {
            Endian::Little => self.inner.read_u32::<LittleEndian>(),
            Endian::Big => self.inner.read_u32::<BigEndian>(),
        }
    }

    /// Reads an `i32`.
    pub fn read_i32(&mut self) -> io::Result<i32> {
        match self.endian {
            Endian::Little => self.inner.read_i32::<LittleEndian>(),
            Endian::Big => self.inner.read_i32::<BigEndian>(),
        }
    }

    /// Reads an `f32`.
    pub fn read_f32(&mut self) -> io::Result<f32> {
        match self.endian {
            Endian::Little => self.inner.read_f32::<LittleEndian>(),
            Endian::Big => self.inner.read_f32::<BigEndian>(),
        }
    }

    /// Reads an `f64`.
    pub fn read_f64(&mut self) -> io::Result<f64> {
        match self.endian {
            Endian::Little => self.inner.read_f64::<LittleEndian>(),
            Endian::Big => self.inner.read_f64::<BigEndian>(),
        }
    }

    /// Reads exactly `len` bytes and decodes them as an ASCII/Latin-1 string,
    /// trimming trailing spaces the way Fortran fixed-width string fields do.
    pub fn read_fixed_string(&mut self, len: usize) -> io::Result<String> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).trim_end().to_string())
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Borrows the underlying reader, e.g. to call `Seek` directly.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consumes this reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<W: Write> ByteReader<W> {
    /// Writes a `u32` using this reader's byte order.
    ///
    /// Named alongside the read half rather than split into a separate
    /// writer type, since every driver that writes also reads the same
    /// stream shape back for verification in its own tests.
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        match self.endian {
            Endian::Little => self.inner.write_u32::<LittleEndian>(value),
            Endian::Big => self.inner.write_u32::<BigEndian>(value),
        }
    }

    /// Writes an `f64`.
    pub fn write_f64(&mut self, value: f64) -> io::Result<()> {
        match self.endian {
            Endian::Little => self.inner.write_f64::<LittleEndian>(value),
            Endian::Big => self.inner.write_f64::<BigEndian>(value),
        }
    }

    /// Writes an `f32`.
    pub fn write_f32(&mut self, value: f32) -> io::Result<()> {
        match self.endian {
            Endian::Little => self.inner.write_f32::<LittleEndian>(value),
            Endian::Big => self.inner.write_f32::<BigEndian>(value),
        }
    }

    /// Writes an `i32`.
    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        match self.endian {
            Endian::Little => self.inner.write_i32::<LittleEndian>(value),
            Endian::Big => self.inner.write_i32::<BigEndian>(value),
        }
    }

    /// Writes raw bytes verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)
    }

    /// Writes a string left-padded to `len` bytes with trailing spaces.
    pub fn write_fixed_string(&mut self, value: &str, len: usize) -> io::Result<()> {
        let mut bytes = value.as_bytes().to_vec();
        bytes.resize(len, b' ');
        bytes.truncate(len);
        self.inner.write_all(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn native_endian_matches_machine() {
        let expected = if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        };
        assert_eq!(Endian::native(), expected);
    }

    #[test]
    fn round_trips_u32_little_endian() {
        let mut buf = Vec::new();
        {
            let mut writer = ByteReader::new(&mut buf, Endian::Little);
            writer.write_u32(0x0102_0304).unwrap();
        }
        let mut reader = ByteReader::new(Cursor::new(buf), Endian::Little);
        assert_eq!(reader.read_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn fixed_string_trims_trailing_spaces() {
        let mut reader = ByteReader::new(Cursor::new(b"abc   ".to_vec()), Endian::Little);
        assert_eq!(reader.read_fixed_string(6).unwrap(), "abc");
    }

    #[test]
    fn round_trips_f32_and_i32_big_endian() {
        let mut buf = Vec::new();
        {
            let mut writer = ByteReader::new(&mut buf, Endian::Big);
            writer.write_f32(1.5).unwrap();
            writer.write_i32(-7).unwrap();
        }
        let mut reader = ByteReader::new(Cursor::new(buf), Endian::Big);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_i32().unwrap(), -7);
    }

    #[test]
    fn fixed_string_write_pads_and_truncates() {
        let mut buf = Vec::new();
        {
            let mut writer = ByteReader::new(&mut buf, Endian::Big);
            writer.write_fixed_string("ab", 4).unwrap();
        }
        assert_eq!(&buf, b"ab  ");
    }
}
