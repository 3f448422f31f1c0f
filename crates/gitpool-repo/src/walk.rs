//! Object graph walking for the upload path.
//!
//! Upload requests name the refs they want; the response pack carries the
//! full reachable closure of those tips. There is no have-negotiation in
//! this core, so the walk never subtracts anything.

use std::collections::{HashSet, VecDeque};

use gitpool_store::ObjectStore;
use gitpool_types::{ObjectId, ObjectKind, RawObject};

use crate::error::{RepoError, RepoResult};

fn malformed(obj: &RawObject, reason: impl Into<String>) -> RepoError {
    RepoError::MalformedObject {
        id: obj.id(),
        kind: obj.kind.name(),
        reason: reason.into(),
    }
}

fn header_id(obj: &RawObject, line: &[u8], key: &str) -> RepoResult<ObjectId> {
    let hex = &line[key.len() + 1..];
    ObjectId::from_any(hex).map_err(|_| malformed(obj, format!("bad {key} header")))
}

/// The ids an object refers to directly.
///
/// Commits name a tree and parents, tags name their object, trees name
/// their entries; blobs are leaves.
pub fn referenced_ids(obj: &RawObject) -> RepoResult<Vec<ObjectId>> {
    let mut ids = Vec::new();
    match obj.kind {
        ObjectKind::Blob => {}
        ObjectKind::Commit => {
            for line in obj.payload.split(|&b| b == b'\n') {
                if line.is_empty() {
                    break;
                }
                if line.starts_with(b"tree ") {
                    ids.push(header_id(obj, line, "tree")?);
                } else if line.starts_with(b"parent ") {
                    ids.push(header_id(obj, line, "parent")?);
                }
            }
            if ids.is_empty() {
                return Err(malformed(obj, "no tree header"));
            }
        }
        ObjectKind::Tag => {
            for line in obj.payload.split(|&b| b == b'\n') {
                if line.is_empty() {
                    break;
                }
                if line.starts_with(b"object ") {
                    ids.push(header_id(obj, line, "object")?);
                }
            }
            if ids.is_empty() {
                return Err(malformed(obj, "no object header"));
            }
        }
        ObjectKind::Tree => {
            // Entries are `<mode> <name>\0` followed by the 20-byte id.
            let data = &obj.payload;
            let mut pos = 0;
            while pos < data.len() {
                let nul = data[pos..]
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or_else(|| malformed(obj, "entry without NUL"))?
                    + pos;
                let id_end = nul + 1 + 20;
                if id_end > data.len() {
                    return Err(malformed(obj, "truncated entry id"));
                }
                let mut raw = [0u8; 20];
                raw.copy_from_slice(&data[nul + 1..id_end]);
                ids.push(ObjectId::from_raw(raw));
                pos = id_end;
            }
        }
    }
    Ok(ids)
}

/// Collect every object reachable from `roots`, roots included.
///
/// Fails with the store's not-found error if anything referenced is
/// absent — a repository serving uploads is expected to be closed under
/// reachability.
pub async fn closure(store: &dyn ObjectStore, roots: &[ObjectId]) -> RepoResult<Vec<RawObject>> {
    let mut seen: HashSet<ObjectId> = HashSet::new();
    let mut queue: VecDeque<ObjectId> = roots.iter().copied().collect();
    let mut out = Vec::new();

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        let obj = store.get(&id).await?;
        for child in referenced_ids(&obj)? {
            if !seen.contains(&child) {
                queue.push_back(child);
            }
        }
        out.push(obj);
    }
    tracing::debug!(roots = roots.len(), objects = out.len(), "walked closure");
    Ok(out)
}
