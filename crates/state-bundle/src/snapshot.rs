// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Snapshot files.
//!
//! A snapshot is one encoded bundle inside a small checksummed envelope:
//!
//! ```text
//! +--------------------------------------------------------+
//! | Magic "STBUNDL\0" (8) | Flags (4) | PayloadLen (8)     |
//! | PayloadCrc32 (4)                                       |
//! +--------------------------------------------------------+
//! | Payload: bundle stream (see `codec::wire`)             |
//! +--------------------------------------------------------+
//! ```
//!
//! All header fields are little-endian. Flags are reserved and written as 0.
//! The envelope has no version field: the stream is append-only.

use crate::bundle::StateBundle;
use crate::codec::{self, DecodeLimits};
use crate::error::{BundleError, Result};
use crate::opaque::OpaqueRegistry;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic bytes: "STBUNDL\0"
pub const MAGIC: [u8; 8] = [0x53, 0x54, 0x42, 0x55, 0x4E, 0x44, 0x4C, 0x00];

/// Snapshot header (24 bytes, fixed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Reserved (4).
    pub flags: u32,
    /// Payload size in bytes (8).
    pub payload_len: u64,
    /// CRC32 of the payload (4).
    pub payload_crc: u32,
}

impl SnapshotHeader {
    pub const SIZE: usize = 24;

    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            flags: 0,
            payload_len: payload.len() as u64,
            payload_crc: crc32fast::hash(payload),
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u32::<LittleEndian>(self.flags)?;
        w.write_u64::<LittleEndian>(self.payload_len)?;
        w.write_u32::<LittleEndian>(self.payload_crc)?;
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(BundleError::InvalidFormat(format!(
                "bad magic {magic:02x?}"
            )));
        }
        Ok(Self {
            flags: r.read_u32::<LittleEndian>()?,
            payload_len: r.read_u64::<LittleEndian>()?,
            payload_crc: r.read_u32::<LittleEndian>()?,
        })
    }
}

/// Encode `bundle` into a complete snapshot image.
pub fn to_bytes(bundle: &StateBundle) -> Result<Vec<u8>> {
    let payload = codec::encode(bundle)?;
    let mut out = Vec::with_capacity(SnapshotHeader::SIZE + payload.len());
    SnapshotHeader::for_payload(&payload).write(&mut out)?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Check the envelope of a snapshot image and decode its bundle.
pub fn from_bytes(
    bytes: &[u8],
    registry: &OpaqueRegistry,
    limits: &DecodeLimits,
) -> Result<StateBundle> {
    let mut reader = bytes;
    let payload = read_payload(&mut reader)?;
    if !reader.is_empty() {
        return Err(BundleError::InvalidFormat(format!(
            "{} bytes after payload",
            reader.len()
        )));
    }
    codec::decode_with_limits(&payload, registry, limits)
}

/// Write `bundle` to `path` as a snapshot.
pub fn write<P: AsRef<Path>>(path: P, bundle: &StateBundle) -> Result<()> {
    let path = path.as_ref();
    let image = to_bytes(bundle)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&image)?;
    writer.flush()?;
    log::debug!(
        "[snapshot] wrote {} ({} entries, {} bytes)",
        path.display(),
        bundle.len(),
        image.len()
    );
    Ok(())
}

/// Read a snapshot from `path`.
pub fn read<P: AsRef<Path>>(
    path: P,
    registry: &OpaqueRegistry,
    limits: &DecodeLimits,
) -> Result<StateBundle> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    let bundle = from_bytes(&bytes, registry, limits)?;
    log::debug!(
        "[snapshot] read {} ({} entries)",
        path.display(),
        bundle.len()
    );
    Ok(bundle)
}

/// Read the header and the checksummed payload, without decoding it.
pub fn read_payload<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let header = SnapshotHeader::read(r)?;
    let len = usize::try_from(header.payload_len).map_err(|_| {
        BundleError::InvalidFormat(format!("payload length {} too large", header.payload_len))
    })?;

    let mut payload = Vec::new();
    r.by_ref().take(header.payload_len).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(BundleError::InvalidFormat(format!(
            "payload truncated: header says {} bytes, found {}",
            len,
            payload.len()
        )));
    }

    let actual = crc32fast::hash(&payload);
    if actual != header.payload_crc {
        return Err(BundleError::ChecksumMismatch {
            expected: header.payload_crc,
            actual,
        });
    }
    Ok(payload)
}
