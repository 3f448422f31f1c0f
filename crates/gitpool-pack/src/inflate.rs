use gitpool_types::RawObject;

use crate::error::{PackError, PackResult};
use crate::scan::{parse_entries, resolve_entries, EntryBase};

/// Fully decode a self-contained pack into raw objects, in entry order.
///
/// Every delta base must be present in the stream; a ref-delta whose base
/// is missing yields [`PackError::MissingBase`].
pub fn inflate(data: &[u8]) -> PackResult<Vec<RawObject>> {
    let entries = parse_entries(data)?;
    let resolved = resolve_entries(&entries)?;

    let mut objects = Vec::with_capacity(entries.len());
    for (entry, slot) in entries.iter().zip(resolved) {
        match slot {
            Some(obj) => objects.push(obj),
            None => {
                return Err(match &entry.base {
                    EntryBase::Ref(id) => PackError::MissingBase(*id),
                    _ => PackError::CorruptEntry {
                        offset: entry.offset,
                        reason: "unresolvable delta chain".into(),
                    },
                });
            }
        }
    }
    Ok(objects)
}
