//! Stream scanning: framing validation, in-stream delta resolution, and
//! external-reference discovery for thin packs.

use std::collections::{HashMap, HashSet};

use gitpool_types::{ObjectId, ObjectKind, RawObject};

use crate::codec::{
    read_entry_header, read_ofs_offset, zlib_decompress_prefix, TYPE_OFS_DELTA, TYPE_REF_DELTA,
};
use crate::delta::apply_delta;
use crate::error::{PackError, PackResult};
use crate::write::checksum;
use crate::{HEADER_LEN, PACK_MAGIC, PACK_VERSION, TRAILER_LEN};

/// What an entry's payload is relative to.
pub(crate) enum EntryBase {
    /// A full object of the given kind.
    None(ObjectKind),
    /// Delta against the entry starting at this absolute offset.
    Ofs(usize),
    /// Delta against the object with this id, wherever it lives.
    Ref(ObjectId),
}

pub(crate) struct ParsedEntry {
    pub offset: usize,
    pub base: EntryBase,
    /// Decompressed entry payload: object bytes, or delta instructions.
    pub payload: Vec<u8>,
}

/// Validate framing and checksum, then decode every entry header+payload.
pub(crate) fn parse_entries(data: &[u8]) -> PackResult<Vec<ParsedEntry>> {
    if data.len() < HEADER_LEN + TRAILER_LEN {
        return Err(PackError::Truncated);
    }
    if &data[..4] != PACK_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[..4]);
        return Err(PackError::BadMagic(magic));
    }
    let version = u32::from_be_bytes(data[4..8].try_into().unwrap());
    if version != PACK_VERSION {
        return Err(PackError::UnsupportedVersion(version));
    }
    let body_end = data.len() - TRAILER_LEN;
    if checksum(&data[..body_end]) != data[body_end..] {
        return Err(PackError::ChecksumMismatch);
    }
    let count = u32::from_be_bytes(data[8..12].try_into().unwrap()) as usize;

    let mut entries = Vec::with_capacity(count);
    let mut pos = HEADER_LEN;
    for _ in 0..count {
        let offset = pos;
        let (tag, size, next) = read_entry_header(data, pos)?;
        pos = next;
        let base = match tag {
            TYPE_OFS_DELTA => {
                let (back, next) = read_ofs_offset(data, pos)?;
                pos = next;
                let base_offset = offset
                    .checked_sub(back as usize)
                    .ok_or_else(|| PackError::CorruptEntry {
                        offset,
                        reason: "ofs-delta offset before start of pack".into(),
                    })?;
                EntryBase::Ofs(base_offset)
            }
            TYPE_REF_DELTA => {
                let end = pos + 20;
                if end > body_end {
                    return Err(PackError::Truncated);
                }
                let mut raw = [0u8; 20];
                raw.copy_from_slice(&data[pos..end]);
                pos = end;
                EntryBase::Ref(ObjectId::from_raw(raw))
            }
            tag => {
                let kind = ObjectKind::from_num(tag).map_err(|_| PackError::UnknownType(tag))?;
                EntryBase::None(kind)
            }
        };
        let (payload, consumed) = zlib_decompress_prefix(&data[pos..body_end])?;
        if payload.len() as u64 != size {
            return Err(PackError::CorruptEntry {
                offset,
                reason: format!(
                    "entry size mismatch: header says {size}, inflated {}",
                    payload.len()
                ),
            });
        }
        pos += consumed;
        entries.push(ParsedEntry {
            offset,
            base,
            payload,
        });
    }
    if pos != body_end {
        return Err(PackError::CorruptEntry {
            offset: pos,
            reason: "garbage after last entry".into(),
        });
    }
    Ok(entries)
}

/// Resolve as many entries as the stream itself allows.
///
/// Returns one slot per entry; entries whose delta chain leaves the
/// stream stay `None`.
pub(crate) fn resolve_entries(entries: &[ParsedEntry]) -> PackResult<Vec<Option<RawObject>>> {
    let offset_to_index: HashMap<usize, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.offset, i))
        .collect();

    let mut resolved: Vec<Option<RawObject>> = vec![None; entries.len()];
    let mut by_id: HashMap<ObjectId, usize> = HashMap::new();

    loop {
        let mut progressed = false;
        for (i, entry) in entries.iter().enumerate() {
            if resolved[i].is_some() {
                continue;
            }
            let obj = match &entry.base {
                EntryBase::None(kind) => {
                    Some(RawObject::new(*kind, entry.payload.clone()))
                }
                EntryBase::Ofs(base_offset) => {
                    let base_index = *offset_to_index.get(base_offset).ok_or_else(|| {
                        PackError::CorruptEntry {
                            offset: entry.offset,
                            reason: "ofs-delta base is not an entry boundary".into(),
                        }
                    })?;
                    resolved[base_index].as_ref().map(|base| {
                        apply_delta(&base.payload, &entry.payload)
                            .map(|payload| RawObject::new(base.kind, payload))
                    }).transpose()?
                }
                EntryBase::Ref(id) => {
                    let base = by_id.get(id).and_then(|&idx| resolved[idx].as_ref());
                    base.map(|base| {
                        apply_delta(&base.payload, &entry.payload)
                            .map(|payload| RawObject::new(base.kind, payload))
                    }).transpose()?
                }
            };
            if let Some(obj) = obj {
                by_id.insert(obj.id(), i);
                resolved[i] = Some(obj);
                progressed = true;
            }
        }
        if !progressed {
            return Ok(resolved);
        }
    }
}

/// What a scan learned about an incoming transfer stream.
#[derive(Debug)]
pub struct ScanReport {
    /// Number of entries the stream contains.
    pub contained: usize,
    /// Ids of the objects resolvable from the stream alone.
    pub contained_ids: HashSet<ObjectId>,
    /// Ref-delta bases the stream references but does not contain,
    /// sorted and deduplicated.
    pub external: Vec<ObjectId>,
}

/// Scan an incoming stream: validate it and report its contents and
/// external references.
pub fn scan(data: &[u8]) -> PackResult<ScanReport> {
    let entries = parse_entries(data)?;
    let resolved = resolve_entries(&entries)?;

    let contained_ids: HashSet<ObjectId> = resolved
        .iter()
        .flatten()
        .map(|obj| obj.id())
        .collect();

    let mut external: Vec<ObjectId> = entries
        .iter()
        .filter_map(|entry| match &entry.base {
            EntryBase::Ref(id) if !contained_ids.contains(id) => Some(*id),
            _ => None,
        })
        .collect();
    external.sort();
    external.dedup();

    tracing::debug!(
        contained = entries.len(),
        external = external.len(),
        "scanned pack stream"
    );
    Ok(ScanReport {
        contained: entries.len(),
        contained_ids,
        external,
    })
}
