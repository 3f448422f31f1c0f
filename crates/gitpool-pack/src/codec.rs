//! Low-level entry encoding: type/size headers, offset varints, zlib.

use std::io::{Read, Write};

use flate2::Compression;

use crate::error::{PackError, PackResult};

/// Entry type tags as they appear in the pack stream.
pub const TYPE_COMMIT: u8 = 1;
pub const TYPE_TREE: u8 = 2;
pub const TYPE_BLOB: u8 = 3;
pub const TYPE_TAG: u8 = 4;
pub const TYPE_OFS_DELTA: u8 = 6;
pub const TYPE_REF_DELTA: u8 = 7;

fn byte_at(data: &[u8], pos: usize) -> PackResult<u8> {
    data.get(pos).copied().ok_or(PackError::Truncated)
}

/// Read an entry's type tag and uncompressed size.
///
/// The first byte carries the type in bits 6-4 and the low 4 size bits;
/// continuation bytes contribute 7 bits each, little-endian.
pub fn read_entry_header(data: &[u8], mut pos: usize) -> PackResult<(u8, u64, usize)> {
    let mut byte = byte_at(data, pos)?;
    pos += 1;
    let type_tag = (byte >> 4) & 0x07;
    let mut size = (byte & 0x0f) as u64;
    let mut shift = 4;
    while byte & 0x80 != 0 {
        byte = byte_at(data, pos)?;
        pos += 1;
        size |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
        if shift > 64 {
            return Err(PackError::CorruptEntry {
                offset: pos,
                reason: "entry size varint overflow".into(),
            });
        }
    }
    Ok((type_tag, size, pos))
}

/// Append an entry's type tag and uncompressed size.
pub fn write_entry_header(buf: &mut Vec<u8>, type_tag: u8, mut size: u64) {
    let mut byte = (type_tag << 4) | (size & 0x0f) as u8;
    size >>= 4;
    while size != 0 {
        buf.push(byte | 0x80);
        byte = (size & 0x7f) as u8;
        size >>= 7;
    }
    buf.push(byte);
}

/// Read an ofs-delta backwards offset (git's biased big-endian varint).
pub fn read_ofs_offset(data: &[u8], mut pos: usize) -> PackResult<(u64, usize)> {
    let mut byte = byte_at(data, pos)?;
    pos += 1;
    let mut value = (byte & 0x7f) as u64;
    while byte & 0x80 != 0 {
        byte = byte_at(data, pos)?;
        pos += 1;
        value = value
            .checked_add(1)
            .and_then(|v| v.checked_shl(7))
            .ok_or(PackError::CorruptEntry {
                offset: pos,
                reason: "ofs-delta offset overflow".into(),
            })?
            | (byte & 0x7f) as u64;
    }
    Ok((value, pos))
}

/// Append an ofs-delta backwards offset.
pub fn write_ofs_offset(buf: &mut Vec<u8>, mut value: u64) {
    let mut bytes = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value != 0 {
        value -= 1;
        bytes.insert(0, 0x80 | (value & 0x7f) as u8);
        value >>= 7;
    }
    buf.extend_from_slice(&bytes);
}

/// Decompress one zlib stream from the front of `data`.
///
/// Returns the decompressed bytes and how many input bytes the stream
/// consumed, so the caller can find the next entry.
pub fn zlib_decompress_prefix(data: &[u8]) -> PackResult<(Vec<u8>, usize)> {
    let mut decoder = flate2::bufread::ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok((out, decoder.total_in() as usize))
}

/// Compress bytes as a standalone zlib stream.
pub fn zlib_compress(data: &[u8]) -> PackResult<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn entry_header_roundtrip_small() {
        let mut buf = Vec::new();
        write_entry_header(&mut buf, TYPE_BLOB, 5);
        let (tag, size, pos) = read_entry_header(&buf, 0).unwrap();
        assert_eq!(tag, TYPE_BLOB);
        assert_eq!(size, 5);
        assert_eq!(pos, 1);
    }

    #[test]
    fn entry_header_roundtrip_large() {
        let mut buf = Vec::new();
        write_entry_header(&mut buf, TYPE_COMMIT, 123_456_789);
        let (tag, size, _) = read_entry_header(&buf, 0).unwrap();
        assert_eq!(tag, TYPE_COMMIT);
        assert_eq!(size, 123_456_789);
    }

    #[test]
    fn entry_header_truncated() {
        let mut buf = Vec::new();
        write_entry_header(&mut buf, TYPE_BLOB, 1 << 20);
        buf.pop();
        assert!(matches!(
            read_entry_header(&buf, 0),
            Err(PackError::Truncated)
        ));
    }

    #[test]
    fn ofs_offset_roundtrip_known() {
        // Boundary values around the biased encoding's byte widths.
        for value in [0u64, 1, 127, 128, 16_383, 16_384, 1 << 21] {
            let mut buf = Vec::new();
            write_ofs_offset(&mut buf, value);
            let (decoded, pos) = read_ofs_offset(&buf, 0).unwrap();
            assert_eq!(decoded, value, "value {value}");
            assert_eq!(pos, buf.len());
        }
    }

    #[test]
    fn zlib_roundtrip() {
        let data = b"compress me".repeat(100);
        let compressed = zlib_compress(&data).unwrap();
        let mut stream = compressed.clone();
        stream.extend_from_slice(b"trailing entry bytes");
        let (out, consumed) = zlib_decompress_prefix(&stream).unwrap();
        assert_eq!(out, data);
        assert_eq!(consumed, compressed.len());
    }

    proptest! {
        #[test]
        fn entry_header_roundtrip(tag in 1u8..=7, size in 0u64..u64::MAX / 2) {
            let mut buf = Vec::new();
            write_entry_header(&mut buf, tag, size);
            let (t, s, pos) = read_entry_header(&buf, 0).unwrap();
            prop_assert_eq!(t, tag);
            prop_assert_eq!(s, size);
            prop_assert_eq!(pos, buf.len());
        }

        #[test]
        fn ofs_offset_roundtrip(value in 0u64..1 << 48) {
            let mut buf = Vec::new();
            write_ofs_offset(&mut buf, value);
            let (v, pos) = read_ofs_offset(&buf, 0).unwrap();
            prop_assert_eq!(v, value);
            prop_assert_eq!(pos, buf.len());
        }
    }
}
