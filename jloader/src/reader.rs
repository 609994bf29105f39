//! A bounded, position-tracked reader over an immutable byte slice.
//!
//! Every structural decoder in this crate (constant pool, class file header,
//! fields/methods, attributes, bytecode) reads through a `Reader` rather than
//! touching the slice directly, so that a short or overrunning read always
//! surfaces as [`JvmError::Truncated`] instead of a panic.

use byteorder::{ReadBytesExt, BE};
use std::io::Cursor;

use crate::errors::JvmError;

pub struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
    len: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader {
            cursor: Cursor::new(bytes),
            len: bytes.len(),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.position())
    }

    fn require(&self, needed: usize) -> Result<(), JvmError> {
        if self.remaining() < needed {
            Err(JvmError::Truncated {
                offset: self.position(),
                needed,
            })
        } else {
            Ok(())
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, JvmError> {
        self.require(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8, JvmError> {
        self.require(1)?;
        Ok(self.cursor.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16, JvmError> {
        self.require(2)?;
        Ok(self.cursor.read_u16::<BE>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16, JvmError> {
        self.require(2)?;
        Ok(self.cursor.read_i16::<BE>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32, JvmError> {
        self.require(4)?;
        Ok(self.cursor.read_u32::<BE>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32, JvmError> {
        self.require(4)?;
        Ok(self.cursor.read_i32::<BE>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64, JvmError> {
        self.require(8)?;
        Ok(self.cursor.read_i64::<BE>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32, JvmError> {
        self.require(4)?;
        Ok(self.cursor.read_f32::<BE>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64, JvmError> {
        self.require(8)?;
        Ok(self.cursor.read_f64::<BE>()?)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, JvmError> {
        self.require(n)?;
        let mut buf = vec![0u8; n];
        std::io::Read::read_exact(&mut self.cursor, &mut buf)?;
        Ok(buf)
    }

    /// Fails with `ExtraData` unless every byte of the underlying slice has
    /// been consumed.
    pub fn expect_exhausted(&self) -> Result<(), JvmError> {
        if self.remaining() != 0 {
            Err(JvmError::ExtraData {
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_primitives() {
        let bytes = [0xCA, 0xFE, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u16().unwrap(), 0xCAFE);
        assert_eq!(r.read_u16().unwrap(), 0x0001);
        assert_eq!(r.read_i32().unwrap(), -1);
        assert!(r.expect_exhausted().is_ok());
    }

    #[test]
    fn truncated_read_is_an_error() {
        let bytes = [0x01];
        let mut r = Reader::new(&bytes);
        assert!(matches!(r.read_u16(), Err(JvmError::Truncated { .. })));
    }

    #[test]
    fn extra_data_is_an_error() {
        let bytes = [0x01, 0x02];
        let mut r = Reader::new(&bytes);
        r.read_u8().unwrap();
        assert!(matches!(
            r.expect_exhausted(),
            Err(JvmError::ExtraData { remaining: 1 })
        ));
    }
}
