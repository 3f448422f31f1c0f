//! Postgres-backed ref container.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use gitpool_db::Db;
use gitpool_types::ObjectId;

use crate::error::RefResult;
use crate::names::check_ref_name;
use crate::traits::RefsContainer;
use crate::types::RefTarget;

const ALL: &str = "SELECT name FROM refs WHERE repo = $1 ORDER BY name";
const GET: &str = "SELECT target FROM refs WHERE name = $1 AND repo = $2";
const UPSERT: &str = "INSERT INTO refs (name, target, repo) VALUES ($1, $2, $3) \
                      ON CONFLICT (name, repo) DO UPDATE SET target = EXCLUDED.target";
const ADD: &str = "INSERT INTO refs (name, target, repo) VALUES ($1, $2, $3) \
                   ON CONFLICT (name, repo) DO NOTHING";
const SWAP: &str = "UPDATE refs SET target = $3 WHERE name = $1 AND repo = $2 AND target = $4";
const DEL: &str = "DELETE FROM refs WHERE name = $1 AND repo = $2";
const DEL_EQ: &str = "DELETE FROM refs WHERE name = $1 AND repo = $2 AND target = $3";

/// Ref container keeping all refs in the shared postgres database.
///
/// Guarded updates put the old-value check into the statement's `WHERE`
/// clause, so of two writers racing from the same old value the row
/// update itself picks the single winner.
///
/// The peeled cache is per-instance process memory: a local hint that is
/// never persisted and never reconciled with other writers.
pub struct PgRefsContainer {
    db: Arc<Db>,
    repo: String,
    peeled: RwLock<HashMap<String, ObjectId>>,
}

impl PgRefsContainer {
    pub fn new(db: Arc<Db>, repo: impl Into<String>) -> Self {
        Self {
            db,
            repo: repo.into(),
            peeled: RwLock::new(HashMap::new()),
        }
    }

    async fn upsert(&self, name: &str, target: &RefTarget) -> RefResult<()> {
        let name = name.to_string();
        let encoded = target.encode();
        let repo = self.repo.clone();
        self.db
            .with_conn(move |tx| {
                let name = name.clone();
                let encoded = encoded.clone();
                let repo = repo.clone();
                Box::pin(async move {
                    tx.execute(UPSERT, &[&name, &encoded, &repo]).await?;
                    Ok(())
                })
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RefsContainer for PgRefsContainer {
    async fn list_names(&self) -> RefResult<Vec<String>> {
        let repo = self.repo.clone();
        let rows = self
            .db
            .with_conn(move |tx| {
                let repo = repo.clone();
                Box::pin(async move { tx.query(ALL, &[&repo]).await })
            })
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn read(&self, name: &str) -> RefResult<Option<RefTarget>> {
        let lookup = name.to_string();
        let repo = self.repo.clone();
        let row = self
            .db
            .with_conn(move |tx| {
                let lookup = lookup.clone();
                let repo = repo.clone();
                Box::pin(async move { tx.query_opt(GET, &[&lookup, &repo]).await })
            })
            .await?;
        match row {
            Some(row) => {
                let stored: Vec<u8> = row.get(0);
                RefTarget::decode(name, &stored).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn compare_and_swap(
        &self,
        name: &str,
        expected_old: Option<&RefTarget>,
        new_target: RefTarget,
    ) -> RefResult<bool> {
        let (real, current) = self.follow(name).await?;
        check_ref_name(&real)?;

        match expected_old {
            Some(expected) => {
                if current.as_ref() != Some(expected) {
                    return Ok(false);
                }
                // Guarded update: the WHERE clause decides the winner.
                let real = real.clone();
                let encoded = new_target.encode();
                let guard = expected.encode();
                let repo = self.repo.clone();
                let updated = self
                    .db
                    .with_conn(move |tx| {
                        let real = real.clone();
                        let encoded = encoded.clone();
                        let guard = guard.clone();
                        let repo = repo.clone();
                        Box::pin(async move {
                            tx.execute(SWAP, &[&real, &repo, &encoded, &guard]).await
                        })
                    })
                    .await?;
                Ok(updated == 1)
            }
            None => {
                self.upsert(&real, &new_target).await?;
                Ok(true)
            }
        }
    }

    async fn add_if_absent(&self, name: &str, target: RefTarget) -> RefResult<bool> {
        check_ref_name(name)?;
        let name = name.to_string();
        let encoded = target.encode();
        let repo = self.repo.clone();
        let inserted = self
            .db
            .with_conn(move |tx| {
                let name = name.clone();
                let encoded = encoded.clone();
                let repo = repo.clone();
                Box::pin(async move { tx.execute(ADD, &[&name, &encoded, &repo]).await })
            })
            .await?;
        Ok(inserted == 1)
    }

    async fn remove_if_equals(
        &self,
        name: &str,
        expected_old: Option<&RefTarget>,
    ) -> RefResult<bool> {
        let name = name.to_string();
        let repo = self.repo.clone();
        match expected_old {
            Some(expected) => {
                let guard = expected.encode();
                let removed = self
                    .db
                    .with_conn(move |tx| {
                        let name = name.clone();
                        let guard = guard.clone();
                        let repo = repo.clone();
                        Box::pin(async move {
                            tx.execute(DEL_EQ, &[&name, &repo, &guard]).await
                        })
                    })
                    .await?;
                Ok(removed == 1)
            }
            None => {
                self.db
                    .with_conn(move |tx| {
                        let name = name.clone();
                        let repo = repo.clone();
                        Box::pin(async move {
                            tx.execute(DEL, &[&name, &repo]).await?;
                            Ok(())
                        })
                    })
                    .await?;
                Ok(true)
            }
        }
    }

    async fn set_symbolic(&self, name: &str, other: &str) -> RefResult<()> {
        check_ref_name(name)?;
        check_ref_name(other)?;
        self.upsert(name, &RefTarget::Symbolic(other.to_string()))
            .await
    }

    fn peeled(&self, name: &str) -> Option<ObjectId> {
        self.peeled.read().expect("lock poisoned").get(name).copied()
    }

    fn record_peeled(&self, name: &str, id: ObjectId) {
        self.peeled
            .write()
            .expect("lock poisoned")
            .insert(name.to_string(), id);
    }
}
