//! Completing incoming transfer streams against the store.
//!
//! A thin pack carries deltas whose bases live only in existing storage.
//! Before anything is committed, the stream is rewritten into a
//! self-contained pack: the header count grows by the number of external
//! references, each referenced base is appended as a full object, and the
//! trailing checksum is recomputed over the rewritten body. Only then is
//! the whole pack decoded and stored in one idempotent batch — no object
//! from a failed transfer is ever committed.

use sha1::{Digest, Sha1};

use gitpool_pack::{inflate, pack_header, scan, write_pack_object, HEADER_LEN, TRAILER_LEN};

use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// Store the contents of a self-contained pack. Returns the object count.
pub async fn add_pack(store: &dyn ObjectStore, data: &[u8]) -> StoreResult<usize> {
    let objects = inflate(data)?;
    store.put_many(&objects).await?;
    Ok(objects.len())
}

/// Rewrite a (possibly thin) pack into a self-contained one.
///
/// Resolves every external reference through the store; if any base is
/// missing the transfer cannot be made self-contained and the whole
/// operation fails with nothing buffered kept.
pub async fn complete_thin_pack(store: &dyn ObjectStore, data: &[u8]) -> StoreResult<Vec<u8>> {
    let report = scan(data)?;
    if report.external.is_empty() {
        return Ok(data.to_vec());
    }

    // Rewrite the optimistic header count and drop the stale trailer.
    let mut buf = data[..data.len() - TRAILER_LEN].to_vec();
    let total = (report.contained + report.external.len()) as u32;
    buf[..HEADER_LEN].copy_from_slice(&pack_header(total));

    // Rescan the body, computing the checksum with the new header.
    let mut hasher = Sha1::new();
    hasher.update(&buf);

    for id in &report.external {
        let base = store.get(id).await?;
        write_pack_object(&mut buf, &base, Some(&mut hasher))?;
    }
    let digest: [u8; 20] = hasher.finalize().into();
    buf.extend_from_slice(&digest);

    tracing::debug!(
        contained = report.contained,
        appended = report.external.len(),
        "completed thin pack"
    );
    Ok(buf)
}

/// Complete a thin pack and commit its objects. Returns the object count.
pub async fn add_thin_pack(store: &dyn ObjectStore, data: &[u8]) -> StoreResult<usize> {
    let completed = complete_thin_pack(store, data).await?;
    add_pack(store, &completed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1::{Digest, Sha1};

    use gitpool_pack::delta::write_size_varint;
    use gitpool_pack::{build_pack, checksum, write_ref_delta_object};
    use gitpool_types::{ObjectKind, RawObject};

    use crate::memory::MemoryObjectStore;

    fn blob(data: &[u8]) -> RawObject {
        RawObject::new(ObjectKind::Blob, data.to_vec())
    }

    /// Delta that ignores the base and inserts `data` literally.
    fn insert_delta(base_len: usize, data: &[u8]) -> Vec<u8> {
        let mut delta = Vec::new();
        write_size_varint(&mut delta, base_len as u64);
        write_size_varint(&mut delta, data.len() as u64);
        delta.push(data.len() as u8);
        delta.extend_from_slice(data);
        delta
    }

    /// A thin pack: one carried blob plus one ref-delta against `base`.
    fn thin_pack(base: &RawObject, carried: &RawObject, target: &[u8]) -> Vec<u8> {
        let mut buf = Vec::from(pack_header(2));
        let mut hasher = Sha1::new();
        hasher.update(&buf);
        write_pack_object(&mut buf, carried, Some(&mut hasher)).unwrap();
        let delta = insert_delta(base.payload.len(), target);
        write_ref_delta_object(&mut buf, base.id(), &delta, Some(&mut hasher)).unwrap();
        let digest: [u8; 20] = hasher.finalize().into();
        buf.extend_from_slice(&digest);
        buf
    }

    #[tokio::test]
    async fn completion_rewrites_header_and_checksum() {
        let store = MemoryObjectStore::new();
        let base = blob(b"the external base");
        store.put(&base).await.unwrap();

        let pack = thin_pack(&base, &blob(b"carried"), b"target bytes");
        let completed = complete_thin_pack(&store, &pack).await.unwrap();

        // Header now declares contained + external objects.
        let count = u32::from_be_bytes(completed[8..12].try_into().unwrap());
        assert_eq!(count, 3);
        // Trailer is valid over the rewritten body.
        let body_end = completed.len() - TRAILER_LEN;
        assert_eq!(completed[body_end..], checksum(&completed[..body_end]));
        // And the result is genuinely self-contained.
        let report = scan(&completed).unwrap();
        assert!(report.external.is_empty());
        assert_eq!(report.contained, 3);
    }

    #[tokio::test]
    async fn add_thin_pack_commits_resolved_objects() {
        let store = MemoryObjectStore::new();
        let base = blob(b"0123456789");
        store.put(&base).await.unwrap();

        let carried = blob(b"carried blob");
        let pack = thin_pack(&base, &carried, b"delta product");
        let count = add_thin_pack(&store, &pack).await.unwrap();
        assert_eq!(count, 3);

        assert!(store.contains(&carried.id()).await.unwrap());
        assert!(store.contains(&blob(b"delta product").id()).await.unwrap());
        assert!(store.contains(&base.id()).await.unwrap());
    }

    #[tokio::test]
    async fn missing_external_reference_commits_nothing() {
        let store = MemoryObjectStore::new();
        let preexisting = blob(b"already here");
        store.put(&preexisting).await.unwrap();

        let absent_base = blob(b"nowhere to be found");
        let pack = thin_pack(&absent_base, &blob(b"carried"), b"whatever");
        let err = add_thin_pack(&store, &pack).await.unwrap_err();
        assert!(matches!(err, crate::error::StoreError::NotFound(_)));

        // Store is untouched: only the pre-existing object remains.
        assert_eq!(store.all_ids().await.unwrap(), vec![preexisting.id()]);
    }

    #[tokio::test]
    async fn self_contained_pack_needs_no_completion() {
        let store = MemoryObjectStore::new();
        let objs = vec![blob(b"one"), blob(b"two")];
        let pack = build_pack(&objs).unwrap();
        let count = add_thin_pack(&store, &pack).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn truncated_stream_is_rejected_before_any_write() {
        let store = MemoryObjectStore::new();
        let pack = build_pack(&[blob(b"x")]).unwrap();
        let err = add_thin_pack(&store, &pack[..pack.len() - 5]).await.unwrap_err();
        assert!(matches!(err, crate::error::StoreError::Pack(_)));
        assert!(store.is_empty());
    }
}
