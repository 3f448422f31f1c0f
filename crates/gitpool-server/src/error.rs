use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use gitpool_pack::PackError;
use gitpool_protocol::ProtocolError;
use gitpool_refs::RefError;
use gitpool_repo::RepoError;
use gitpool_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// `info/refs` without a `service` parameter: the dumb transfer
    /// protocol, which this server does not speak.
    #[error("dumb transfer protocol is not supported")]
    DumbProtocol,

    /// Reading the request body failed (including mid-stream disconnect).
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ref error: {0}")]
    Refs(#[from] RefError),

    #[error("pack error: {0}")]
    Pack(#[from] PackError),

    #[error("database error: {0}")]
    Db(#[from] gitpool_db::DbError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Map the error taxonomy onto the three response codes: typed misses
    /// become 404, an unsupported service 403, everything else 500.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::DumbProtocol => StatusCode::NOT_FOUND,
            ServerError::Repo(RepoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Repo(RepoError::Store(StoreError::NotFound(_))) => StatusCode::NOT_FOUND,
            ServerError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Protocol(ProtocolError::UnsupportedService(_)) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
