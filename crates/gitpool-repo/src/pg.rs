//! Postgres-backed registry and schema bootstrap.

use std::sync::Arc;

use async_trait::async_trait;

use gitpool_db::Db;
use gitpool_refs::PgRefsContainer;
use gitpool_store::PgObjectStore;

use crate::error::{RepoError, RepoResult};
use crate::registry::{check_repo_name, Backend};
use crate::repository::Repository;

/// Object store table, keyed by content hash and tenant.
const CREATE_OBJECTS: &str = "CREATE TABLE IF NOT EXISTS objects (
    id CHAR(40) NOT NULL,
    kind SMALLINT NOT NULL,
    size BIGINT NOT NULL,
    payload BYTEA NOT NULL,
    repo VARCHAR(64) NOT NULL,
    PRIMARY KEY (id, repo)
)";
const CREATE_OBJECTS_KIND_IDX: &str =
    "CREATE INDEX IF NOT EXISTS objects_kind_idx ON objects (kind)";

/// Reference table, keyed by name and tenant.
const CREATE_REFS: &str = "CREATE TABLE IF NOT EXISTS refs (
    name VARCHAR(100) NOT NULL,
    target BYTEA NOT NULL,
    repo VARCHAR(64) NOT NULL,
    PRIMARY KEY (name, repo)
)";
const CREATE_REFS_TARGET_IDX: &str =
    "CREATE INDEX IF NOT EXISTS refs_target_idx ON refs (target)";

const EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM objects WHERE repo = $1) \
                      OR EXISTS(SELECT 1 FROM refs WHERE repo = $1)";
const LIST: &str = "SELECT repo FROM objects UNION SELECT repo FROM refs ORDER BY repo";
const DELETE_OBJECTS: &str = "DELETE FROM objects WHERE repo = $1";
const DELETE_REFS: &str = "DELETE FROM refs WHERE repo = $1";

/// Registry over the shared postgres database.
///
/// A namespace exists when it has rows; `open` therefore never fails and
/// a repository materializes with its first pushed content.
pub struct PgBackend {
    db: Arc<Db>,
}

impl PgBackend {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Create both tables and their indexes if missing. Run once at
    /// startup.
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        self.db
            .with_conn(|tx| {
                Box::pin(async move {
                    for ddl in [
                        CREATE_OBJECTS,
                        CREATE_OBJECTS_KIND_IDX,
                        CREATE_REFS,
                        CREATE_REFS_TARGET_IDX,
                    ] {
                        tx.batch_execute(ddl).await?;
                    }
                    Ok(())
                })
            })
            .await?;
        tracing::info!("database schema ready");
        Ok(())
    }

    fn repository(&self, name: &str) -> Repository {
        Repository::new(
            name,
            Arc::new(PgObjectStore::new(self.db.clone(), name)),
            Arc::new(PgRefsContainer::new(self.db.clone(), name)),
        )
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn create(&self, name: &str) -> RepoResult<Repository> {
        check_repo_name(name)?;
        if self.exists(name).await? {
            return Err(RepoError::AlreadyExists(name.to_string()));
        }
        tracing::info!(repo = name, "created repository");
        Ok(self.repository(name))
    }

    async fn open(&self, name: &str) -> RepoResult<Repository> {
        check_repo_name(name)?;
        Ok(self.repository(name))
    }

    async fn exists(&self, name: &str) -> RepoResult<bool> {
        let name = name.to_string();
        let row = self
            .db
            .with_conn(move |tx| {
                let name = name.clone();
                Box::pin(async move { tx.query_one(EXISTS, &[&name]).await })
            })
            .await?;
        Ok(row.get(0))
    }

    async fn list(&self) -> RepoResult<Vec<String>> {
        let rows = self
            .db
            .with_conn(|tx| Box::pin(async move { tx.query(LIST, &[]).await }))
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn delete(&self, name: &str) -> RepoResult<()> {
        // Two scoped deletions, deliberately not atomic across tables.
        for statement in [DELETE_OBJECTS, DELETE_REFS] {
            let name = name.to_string();
            self.db
                .with_conn(move |tx| {
                    let name = name.clone();
                    Box::pin(async move {
                        tx.execute(statement, &[&name]).await?;
                        Ok(())
                    })
                })
                .await?;
        }
        tracing::info!(repo = name, "deleted repository");
        Ok(())
    }
}
