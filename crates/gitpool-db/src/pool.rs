//! The bounded connection pool and its scoped-transaction entry point.

use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, PoolError, RecyclingMethod, Runtime};
use futures::future::BoxFuture;
use tokio_postgres::{IsolationLevel, NoTls, Transaction};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};

/// Scoped database operation: borrows a transaction, returns a boxed
/// future resolving to the operation's result.
///
/// Callers clone whatever owned state the future needs inside the closure
/// body, so a retried attempt starts from scratch.
pub type ScopedOp<'a, T> = BoxFuture<'a, Result<T, tokio_postgres::Error>>;

/// Handle to the process-wide connection pool.
///
/// Constructed once at startup and passed by reference to every store.
/// All access goes through [`Db::with_conn`]: one acquisition, one
/// read-committed transaction, commit on success, rollback on failure,
/// release on every exit path.
pub struct Db {
    pool: Pool,
    retries: usize,
}

impl Db {
    /// Build the pool from a config. No connection is opened until first
    /// use.
    pub fn connect(config: &DbConfig) -> DbResult<Self> {
        let manager = Manager::from_config(
            config.pg_config()?,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(Duration::from_millis(config.wait_timeout_ms)))
            .build()
            .map_err(|e| DbError::Config(e.to_string()))?;
        Ok(Self {
            pool,
            retries: config.retries,
        })
    }

    /// Run a scoped operation with commit-or-rollback semantics and
    /// bounded retry on transient failures.
    ///
    /// The transaction runs at read-committed isolation. On a transient
    /// failure the whole operation is retried from a fresh connection, up
    /// to the configured attempt bound; the last error surfaces after
    /// that. Retrying whole is safe because the operation is
    /// self-contained — nothing of a failed attempt outlives its
    /// rolled-back transaction.
    pub async fn with_conn<T, F>(&self, op: F) -> DbResult<T>
    where
        F: for<'a> Fn(&'a Transaction<'a>) -> ScopedOp<'a, T> + Send + Sync,
        T: Send,
    {
        run_retrying(self.retries, || self.attempt(&op)).await
    }

    async fn attempt<T, F>(&self, op: &F) -> DbResult<T>
    where
        F: for<'a> Fn(&'a Transaction<'a>) -> ScopedOp<'a, T> + Send + Sync,
        T: Send,
    {
        let mut client = self.acquire().await?;
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::ReadCommitted)
            .start()
            .await?;
        match op(&tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            // Dropping the transaction rolls it back; the connection goes
            // back to the pool when `client` drops.
            Err(err) => Err(err.into()),
        }
    }

    /// Check a connection out of the pool.
    ///
    /// An exhausted pool surfaces as a wait timeout; deadpool replenishes
    /// up to `max_size` on demand, so one more acquisition attempt is made
    /// before giving up.
    async fn acquire(&self) -> DbResult<Object> {
        match self.pool.get().await {
            Ok(conn) => Ok(conn),
            Err(PoolError::Timeout(_)) => {
                tracing::warn!("connection pool exhausted, retrying acquisition");
                self.pool.get().await.map_err(DbError::from)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("max_size", &self.pool.status().max_size)
            .field("retries", &self.retries)
            .finish()
    }
}

/// The retry loop, separated from the pool so the bound is testable.
pub(crate) async fn run_retrying<T, F, Fut>(attempts: usize, mut op: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = DbResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                tracing::warn!(attempt, error = %err, "transient database failure, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn transient_failures_use_every_attempt() {
        let calls = Cell::new(0usize);
        let result: DbResult<()> = run_retrying(3, || {
            calls.set(calls.get() + 1);
            async { Err(DbError::Transient("injected".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn success_stops_retrying() {
        let calls = Cell::new(0usize);
        let result = run_retrying(3, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 2 {
                    Err(DbError::Transient("injected".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn permanent_failures_do_not_retry() {
        let calls = Cell::new(0usize);
        let result: DbResult<()> = run_retrying(3, || {
            calls.set(calls.get() + 1);
            async { Err(DbError::Config("bad".into())) }
        })
        .await;
        assert!(matches!(result, Err(DbError::Config(_))));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn single_attempt_bound_is_respected() {
        let calls = Cell::new(0usize);
        let result: DbResult<()> = run_retrying(1, || {
            calls.set(calls.get() + 1);
            async { Err(DbError::Transient("injected".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
