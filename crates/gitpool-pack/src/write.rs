//! Pack writing: headers, entries, whole packs, checksums.

use sha1::{Digest, Sha1};

use gitpool_types::{ObjectId, RawObject};

use crate::codec::{write_entry_header, zlib_compress, TYPE_REF_DELTA};
use crate::error::PackResult;
use crate::{HEADER_LEN, PACK_MAGIC, PACK_VERSION};

/// The 12-byte pack header for the given object count.
///
/// Also used to rewrite the count in place when a thin pack is completed.
pub fn pack_header(count: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(PACK_MAGIC);
    header[4..8].copy_from_slice(&PACK_VERSION.to_be_bytes());
    header[8..].copy_from_slice(&count.to_be_bytes());
    header
}

/// SHA-1 over a byte range, as used for the pack trailer.
pub fn checksum(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Append one full (non-delta) object entry.
///
/// When `hasher` is given, the appended bytes are fed into it so a running
/// trailer checksum stays valid.
pub fn write_pack_object(
    buf: &mut Vec<u8>,
    obj: &RawObject,
    hasher: Option<&mut Sha1>,
) -> PackResult<()> {
    let start = buf.len();
    write_entry_header(buf, obj.kind.as_num(), obj.size());
    let compressed = zlib_compress(&obj.payload)?;
    buf.extend_from_slice(&compressed);
    if let Some(hasher) = hasher {
        hasher.update(&buf[start..]);
    }
    Ok(())
}

/// Append a ref-delta entry against the given base id.
pub fn write_ref_delta_object(
    buf: &mut Vec<u8>,
    base: ObjectId,
    delta: &[u8],
    hasher: Option<&mut Sha1>,
) -> PackResult<()> {
    let start = buf.len();
    write_entry_header(buf, TYPE_REF_DELTA, delta.len() as u64);
    buf.extend_from_slice(base.as_bytes());
    let compressed = zlib_compress(delta)?;
    buf.extend_from_slice(&compressed);
    if let Some(hasher) = hasher {
        hasher.update(&buf[start..]);
    }
    Ok(())
}

/// Build a self-contained pack holding the given objects, trailer included.
pub fn build_pack(objects: &[RawObject]) -> PackResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&pack_header(objects.len() as u32));
    for obj in objects {
        write_pack_object(&mut buf, obj, None)?;
    }
    let digest = checksum(&buf);
    buf.extend_from_slice(&digest);
    Ok(buf)
}
