//! Request body reading, capped at the declared length.
//!
//! The body is an adversarial stream: a client may declare one length and
//! send another, or keep the connection open indefinitely. Reading stops
//! as soon as the declared Content-Length (bounded by the configured hard
//! ceiling) has arrived, whether or not the transport has more to give.

use axum::body::Body;
use axum::http::{header, HeaderMap};
use futures::StreamExt;

use crate::error::{ServerError, ServerResult};

/// The declared Content-Length, if the header is present and parseable.
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Read at most `min(declared, hard_cap)` bytes from the body.
///
/// A short stream yields what arrived; a transport failure mid-stream
/// surfaces as [`ServerError::BodyRead`], taking the same abort path as
/// any other request failure.
pub async fn read_capped(
    body: Body,
    declared: Option<u64>,
    hard_cap: u64,
) -> ServerResult<Vec<u8>> {
    let cap = declared.unwrap_or(hard_cap).min(hard_cap) as usize;
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while buf.len() < cap {
        match stream.next().await {
            Some(Ok(chunk)) => {
                let take = (cap - buf.len()).min(chunk.len());
                buf.extend_from_slice(&chunk[..take]);
                if take < chunk.len() {
                    break;
                }
            }
            Some(Err(err)) => return Err(ServerError::BodyRead(err.to_string())),
            None => break,
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn reads_the_whole_declared_body() {
        let body = Body::from("twelve bytes");
        let read = read_capped(body, Some(12), 1024).await.unwrap();
        assert_eq!(read, b"twelve bytes");
    }

    #[tokio::test]
    async fn stops_at_the_declared_length() {
        let body = Body::from("declared|surplus the client kept sending");
        let read = read_capped(body, Some(8), 1024).await.unwrap();
        assert_eq!(read, b"declared");
    }

    #[tokio::test]
    async fn hard_ceiling_overrides_a_huge_declaration() {
        let body = Body::from("0123456789");
        let read = read_capped(body, Some(u64::MAX), 4).await.unwrap();
        assert_eq!(read, b"0123");
    }

    #[tokio::test]
    async fn missing_declaration_reads_to_end_under_ceiling() {
        let body = Body::from("short");
        let read = read_capped(body, None, 1024).await.unwrap();
        assert_eq!(read, b"short");
    }

    #[test]
    fn content_length_parses_when_present() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), None);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(content_length(&headers), Some(42));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("nope"));
        assert_eq!(content_length(&headers), None);
    }
}
