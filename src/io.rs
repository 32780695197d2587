//! Little-endian binary primitives shared by every on-disk format in `persist`.

use crate::error::{Error, PassiveResult, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
pub use std::io::{Read, Write};

/// Extension trait for the small set of primitives the wire formats need.
pub trait Data: Sized {
    fn read(read: &mut impl Read) -> Result<Self>;
    fn write(self, write: &mut impl Write) -> PassiveResult;
}

impl Data for u8 {
    fn read(read: &mut impl Read) -> Result<Self> {
        Ok(read.read_u8()?)
    }

    fn write(self, write: &mut impl Write) -> PassiveResult {
        Ok(write.write_u8(self)?)
    }
}

impl Data for bool {
    fn read(read: &mut impl Read) -> Result<Self> {
        Ok(read.read_u8()? != 0)
    }

    fn write(self, write: &mut impl Write) -> PassiveResult {
        Ok(write.write_u8(self as u8)?)
    }
}

impl Data for i32 {
    fn read(read: &mut impl Read) -> Result<Self> {
        Ok(read.read_i32::<LittleEndian>()?)
    }

    fn write(self, write: &mut impl Write) -> PassiveResult {
        Ok(write.write_i32::<LittleEndian>(self)?)
    }
}

impl Data for u32 {
    fn read(read: &mut impl Read) -> Result<Self> {
        Ok(read.read_u32::<LittleEndian>()?)
    }

    fn write(self, write: &mut impl Write) -> PassiveResult {
        Ok(write.write_u32::<LittleEndian>(self)?)
    }
}

impl Data for u64 {
    fn read(read: &mut impl Read) -> Result<Self> {
        Ok(read.read_u64::<LittleEndian>()?)
    }

    fn write(self, write: &mut impl Write) -> PassiveResult {
        Ok(write.write_u64::<LittleEndian>(self)?)
    }
}

/// Reads a non-negative length prefix, rejecting negative or suspiciously
/// large values before the caller allocates a buffer of that size.
pub fn read_len(read: &mut impl Read, max: usize) -> Result<usize> {
    let len = i32::read(read)?;

    if len < 0 {
        return Err(Error::corrupt("negative length prefix"));
    }

    let len = len as usize;
    if len > max {
        return Err(Error::corrupt(format!(
            "length prefix {} exceeds maximum {}",
            len, max
        )));
    }

    Ok(len)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn primitives_roundtrip() {
        let mut buffer = Vec::new();
        42u8.write(&mut buffer).unwrap();
        true.write(&mut buffer).unwrap();
        (-17i32).write(&mut buffer).unwrap();
        9000u32.write(&mut buffer).unwrap();
        0xdead_beef_cafe_babeu64.write(&mut buffer).unwrap();

        let mut cursor = buffer.as_slice();
        assert_eq!(u8::read(&mut cursor).unwrap(), 42);
        assert_eq!(bool::read(&mut cursor).unwrap(), true);
        assert_eq!(i32::read(&mut cursor).unwrap(), -17);
        assert_eq!(u32::read(&mut cursor).unwrap(), 9000);
        assert_eq!(u64::read(&mut cursor).unwrap(), 0xdead_beef_cafe_babe);
    }

    #[test]
    fn read_len_rejects_oversized() {
        let mut buffer = Vec::new();
        1_000_000i32.write(&mut buffer).unwrap();
        let mut cursor = buffer.as_slice();
        assert!(read_len(&mut cursor, 1000).is_err());
    }
}
