/// Errors from pool construction and scoped database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The connection URL or pool configuration is unusable.
    #[error("database configuration error: {0}")]
    Config(String),

    /// The pool could not supply a connection.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// An error reported by postgres itself.
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A transient failure injected by tests.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl DbError {
    /// Whether retrying the whole scoped operation may succeed.
    ///
    /// Connection loss, pool exhaustion, serialization failures (40001),
    /// deadlocks (40P01), connection-exception class 08, and
    /// too-many-connections (53300) are transient; everything else is
    /// surfaced immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            DbError::Transient(_) => true,
            DbError::Pool(_) => true,
            DbError::Postgres(err) => is_transient_pg(err),
            DbError::Config(_) => false,
        }
    }
}

fn is_transient_pg(err: &tokio_postgres::Error) -> bool {
    if err.is_closed() {
        return true;
    }
    match err.code() {
        Some(state) => {
            let code = state.code();
            code.starts_with("08") || code == "40001" || code == "40P01" || code == "53300"
        }
        None => false,
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Backend(e) => DbError::Postgres(e),
            other => DbError::Pool(other.to_string()),
        }
    }
}

/// Result alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_transient_is_transient() {
        assert!(DbError::Transient("boom".into()).is_transient());
    }

    #[test]
    fn pool_errors_are_transient() {
        assert!(DbError::Pool("exhausted".into()).is_transient());
    }

    #[test]
    fn config_errors_are_not() {
        assert!(!DbError::Config("bad url".into()).is_transient());
    }
}
