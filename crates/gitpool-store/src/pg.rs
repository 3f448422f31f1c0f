//! Postgres-backed object store.

use std::sync::Arc;

use async_trait::async_trait;

use gitpool_db::Db;
use gitpool_pack::codec::{zlib_compress, zlib_decompress_prefix};
use gitpool_types::{ObjectId, ObjectKind, RawObject};

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

const HAS: &str = "SELECT EXISTS(SELECT 1 FROM objects WHERE id = $1 AND repo = $2)";
const ALL: &str = "SELECT id FROM objects WHERE repo = $1";
const GET: &str = "SELECT kind, size, payload FROM objects WHERE id = $1 AND repo = $2";
const ADD: &str = "INSERT INTO objects (id, kind, size, payload, repo) \
                   VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id, repo) DO NOTHING";
const DEL: &str = "DELETE FROM objects WHERE id = $1 AND repo = $2";

/// Object store keeping all objects in the shared postgres database.
///
/// Every statement carries the repository discriminator, payloads are
/// zlib-compressed before they reach the wire, and each operation is
/// exactly one scoped transaction through the pool.
pub struct PgObjectStore {
    db: Arc<Db>,
    repo: String,
}

impl PgObjectStore {
    pub fn new(db: Arc<Db>, repo: impl Into<String>) -> Self {
        Self {
            db,
            repo: repo.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for PgObjectStore {
    async fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        let hex = id.to_hex();
        let repo = self.repo.clone();
        let row = self
            .db
            .with_conn(move |tx| {
                let hex = hex.clone();
                let repo = repo.clone();
                Box::pin(async move { tx.query_one(HAS, &[&hex, &repo]).await })
            })
            .await?;
        Ok(row.get(0))
    }

    async fn get(&self, id: &ObjectId) -> StoreResult<RawObject> {
        let hex = id.to_hex();
        let repo = self.repo.clone();
        let row = self
            .db
            .with_conn(move |tx| {
                let hex = hex.clone();
                let repo = repo.clone();
                Box::pin(async move { tx.query_opt(GET, &[&hex, &repo]).await })
            })
            .await?
            .ok_or(StoreError::NotFound(*id))?;

        let kind = ObjectKind::from_num(row.get::<_, i16>(0) as u8).map_err(|_| {
            StoreError::CorruptObject {
                id: *id,
                reason: format!("unknown kind tag {}", row.get::<_, i16>(0)),
            }
        })?;
        let size: i64 = row.get(1);
        let compressed: Vec<u8> = row.get(2);
        let (payload, _) = zlib_decompress_prefix(&compressed)?;
        if payload.len() as i64 != size {
            return Err(StoreError::CorruptObject {
                id: *id,
                reason: format!("size mismatch: row says {size}, inflated {}", payload.len()),
            });
        }
        Ok(RawObject::new(kind, payload))
    }

    async fn put(&self, obj: &RawObject) -> StoreResult<()> {
        let hex = obj.id().to_hex();
        let kind = obj.kind.as_num() as i16;
        let size = obj.size() as i64;
        let compressed = zlib_compress(&obj.payload)?;
        let repo = self.repo.clone();
        self.db
            .with_conn(move |tx| {
                let hex = hex.clone();
                let compressed = compressed.clone();
                let repo = repo.clone();
                Box::pin(async move {
                    tx.execute(ADD, &[&hex, &kind, &size, &compressed, &repo])
                        .await?;
                    Ok(())
                })
            })
            .await?;
        Ok(())
    }

    async fn put_many(&self, objs: &[RawObject]) -> StoreResult<()> {
        let mut rows = Vec::with_capacity(objs.len());
        for obj in objs {
            rows.push((
                obj.id().to_hex(),
                obj.kind.as_num() as i16,
                obj.size() as i64,
                zlib_compress(&obj.payload)?,
            ));
        }
        let repo = self.repo.clone();
        self.db
            .with_conn(move |tx| {
                let rows = rows.clone();
                let repo = repo.clone();
                Box::pin(async move {
                    for (hex, kind, size, payload) in &rows {
                        tx.execute(ADD, &[hex, kind, size, payload, &repo]).await?;
                    }
                    Ok(())
                })
            })
            .await?;
        tracing::debug!(count = objs.len(), repo = %self.repo, "stored object batch");
        Ok(())
    }

    async fn delete(&self, ids: &[ObjectId]) -> StoreResult<()> {
        let hexes: Vec<String> = ids.iter().map(|id| id.to_hex()).collect();
        let repo = self.repo.clone();
        self.db
            .with_conn(move |tx| {
                let hexes = hexes.clone();
                let repo = repo.clone();
                Box::pin(async move {
                    for hex in &hexes {
                        tx.execute(DEL, &[hex, &repo]).await?;
                    }
                    Ok(())
                })
            })
            .await?;
        Ok(())
    }

    async fn all_ids(&self) -> StoreResult<Vec<ObjectId>> {
        let repo = self.repo.clone();
        let rows = self
            .db
            .with_conn(move |tx| {
                let repo = repo.clone();
                Box::pin(async move { tx.query(ALL, &[&repo]).await })
            })
            .await?;
        rows.iter()
            .map(|row| {
                let hex: String = row.get(0);
                ObjectId::from_hex(hex.trim_end()).map_err(StoreError::from)
            })
            .collect()
    }
}
