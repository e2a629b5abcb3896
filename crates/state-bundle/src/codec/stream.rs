// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-stream transport traits.
//!
//! The bundle codec only needs ordered primitive writes/reads and
//! length-prefixed strings. Any `std::io::Write`/`std::io::Read` provides
//! them through the blanket implementations below (little-endian, via
//! `byteorder`), so a `Vec<u8>`, a `&[u8]`, a `File` or a socket can carry a
//! bundle. Opaque objects receive these traits as `&mut dyn BundleWrite` /
//! `&mut dyn BundleRead`.
//!
//! Length prefixes are `i32`; `-1` encodes null.

use crate::error::{BundleError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Length prefix that marks a null reference.
pub const NULL_LENGTH: i32 = -1;

/// Ordered primitive writes.
pub trait BundleWrite {
    fn write_byte(&mut self, value: u8) -> Result<()>;
    fn write_i16_le(&mut self, value: i16) -> Result<()>;
    fn write_u32_le(&mut self, value: u32) -> Result<()>;
    fn write_i32_le(&mut self, value: i32) -> Result<()>;
    fn write_i64_le(&mut self, value: i64) -> Result<()>;
    fn write_f32_le(&mut self, value: f32) -> Result<()>;
    fn write_f64_le(&mut self, value: f64) -> Result<()>;
    fn write_raw(&mut self, data: &[u8]) -> Result<()>;

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_byte(u8::from(value))
    }

    /// Length prefix; `None` writes the null marker.
    fn write_len(&mut self, len: Option<usize>) -> Result<()> {
        match len {
            None => self.write_i32_le(NULL_LENGTH),
            Some(len) => {
                let len = i32::try_from(len).map_err(|_| {
                    BundleError::invalid_argument(format!("length {len} exceeds i32::MAX"))
                })?;
                self.write_i32_le(len)
            }
        }
    }

    /// Length-prefixed UTF-8 string; `None` writes the null marker.
    fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            None => self.write_len(None),
            Some(s) => {
                self.write_len(Some(s.len()))?;
                self.write_raw(s.as_bytes())
            }
        }
    }
}

/// Ordered primitive reads, mirroring [`BundleWrite`].
pub trait BundleRead {
    fn read_byte(&mut self) -> Result<u8>;
    fn read_i16_le(&mut self) -> Result<i16>;
    fn read_u32_le(&mut self) -> Result<u32>;
    fn read_i32_le(&mut self) -> Result<i32>;
    fn read_i64_le(&mut self) -> Result<i64>;
    fn read_f32_le(&mut self) -> Result<f32>;
    fn read_f64_le(&mut self) -> Result<f64>;

    /// Read exactly `len` bytes. Allocation grows with the data actually
    /// present, so a corrupt length cannot reserve gigabytes up front.
    fn read_raw(&mut self, len: usize) -> Result<Vec<u8>>;

    fn read_bool(&mut self) -> Result<bool> {
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BundleError::malformed(format!(
                "boolean byte must be 0 or 1, got {other}"
            ))),
        }
    }

    /// Length prefix; `None` for the null marker.
    fn read_len(&mut self) -> Result<Option<usize>> {
        match self.read_i32_le()? {
            NULL_LENGTH => Ok(None),
            len if len < 0 => Err(BundleError::malformed(format!("negative length {len}"))),
            len => Ok(Some(len as usize)),
        }
    }

    fn read_string(&mut self) -> Result<Option<String>> {
        match self.read_len()? {
            None => Ok(None),
            Some(len) => {
                let bytes = self.read_raw(len)?;
                Ok(Some(String::from_utf8(bytes)?))
            }
        }
    }
}

impl<W: Write + ?Sized> BundleWrite for W {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        WriteBytesExt::write_u8(self, value)?;
        Ok(())
    }

    fn write_i16_le(&mut self, value: i16) -> Result<()> {
        self.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i32_le(&mut self, value: i32) -> Result<()> {
        self.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i64_le(&mut self, value: i64) -> Result<()> {
        self.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_f32_le(&mut self, value: f32) -> Result<()> {
        self.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_f64_le(&mut self, value: f64) -> Result<()> {
        self.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.write_all(data)?;
        Ok(())
    }
}

impl<R: Read + ?Sized> BundleRead for R {
    fn read_byte(&mut self) -> Result<u8> {
        Ok(ReadBytesExt::read_u8(self)?)
    }

    fn read_i16_le(&mut self) -> Result<i16> {
        Ok(self.read_i16::<LittleEndian>()?)
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        Ok(self.read_u32::<LittleEndian>()?)
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        Ok(self.read_i32::<LittleEndian>()?)
    }

    fn read_i64_le(&mut self) -> Result<i64> {
        Ok(self.read_i64::<LittleEndian>()?)
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        Ok(self.read_f32::<LittleEndian>()?)
    }

    fn read_f64_le(&mut self) -> Result<f64> {
        Ok(self.read_f64::<LittleEndian>()?)
    }

    fn read_raw(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        Read::take(&mut *self, len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(BundleError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("needed {len} bytes, stream had {}", buf.len()),
            )));
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_little_endian() {
        let mut buf = Vec::new();
        buf.write_i32_le(0x0102_0304).expect("write");
        buf.write_i16_le(-2).expect("write");
        buf.write_bool(true).expect("write");
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01, 0xfe, 0xff, 0x01]);

        let mut reader: &[u8] = &buf;
        assert_eq!(reader.read_i32_le().expect("read"), 0x0102_0304);
        assert_eq!(reader.read_i16_le().expect("read"), -2);
        assert!(reader.read_bool().expect("read"));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_null_and_empty_strings_differ() {
        let mut buf = Vec::new();
        buf.write_string(None).expect("write");
        buf.write_string(Some("")).expect("write");
        buf.write_string(Some("héllo")).expect("write");

        let mut reader: &[u8] = &buf;
        assert_eq!(reader.read_string().expect("read"), None);
        assert_eq!(reader.read_string().expect("read"), Some(String::new()));
        assert_eq!(reader.read_string().expect("read").as_deref(), Some("héllo"));
    }

    #[test]
    fn test_negative_length_is_malformed() {
        let mut buf = Vec::new();
        buf.write_i32_le(-7).expect("write");
        let mut reader: &[u8] = &buf;
        assert!(matches!(reader.read_len(), Err(BundleError::Malformed(_))));
    }

    #[test]
    fn test_truncated_raw_read() {
        let mut buf = Vec::new();
        buf.write_len(Some(10)).expect("write");
        buf.write_raw(b"abc").expect("write");
        let mut reader: &[u8] = &buf;
        let err = reader.read_string().unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_invalid_bool_byte() {
        let mut reader: &[u8] = &[2];
        assert!(matches!(reader.read_bool(), Err(BundleError::Malformed(_))));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut buf = Vec::new();
        buf.write_len(Some(2)).expect("write");
        buf.write_raw(&[0xff, 0xfe]).expect("write");
        let mut reader: &[u8] = &buf;
        assert!(matches!(reader.read_string(), Err(BundleError::Utf8(_))));
    }
}
