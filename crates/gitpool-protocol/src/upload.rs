//! Upload side: the client's want list.
//!
//! There is no have-negotiation here; `have` and `done` lines are
//! consumed and ignored, and the server answers with `NAK` followed by a
//! pack carrying the full closure of the wants.

use gitpool_types::ObjectId;

use crate::error::{ProtocolError, ProtocolResult};
use crate::pktline::{pkt_line, Pkt, PktReader};

/// A parsed upload request.
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub wants: Vec<ObjectId>,
}

fn bad_line(line: &[u8]) -> ProtocolError {
    ProtocolError::BadLine {
        kind: "upload",
        line: String::from_utf8_lossy(line).into_owned(),
    }
}

/// Parse an upload-pack request body: `want <id>` lines (the first may
/// carry capabilities), interleaved flushes, `have` and `done` ignored.
pub fn parse_upload_request(body: &[u8]) -> ProtocolResult<UploadRequest> {
    let mut reader = PktReader::new(body);
    let mut wants = Vec::new();

    while let Some(pkt) = reader.next_pkt()? {
        let line = match pkt {
            Pkt::Flush => continue,
            Pkt::Line(line) => line,
        };
        let line = match line.last() {
            Some(b'\n') => &line[..line.len() - 1],
            _ => line,
        };
        if let Some(rest) = line.strip_prefix(b"want ") {
            if rest.len() < 40 {
                return Err(bad_line(line));
            }
            let id = ObjectId::from_any(&rest[..40]).map_err(|_| bad_line(line))?;
            wants.push(id);
        } else if line.starts_with(b"have ") || line == b"done" || line.is_empty() {
            continue;
        } else {
            return Err(bad_line(line));
        }
    }

    wants.sort();
    wants.dedup();
    Ok(UploadRequest { wants })
}

/// The `NAK` line that precedes the response pack.
pub fn nak() -> Vec<u8> {
    pkt_line(b"NAK\n").expect("short constant line")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitpool_types::ObjectKind;

    use crate::pktline::FLUSH_PKT;

    fn oid(data: &[u8]) -> ObjectId {
        ObjectId::hash_object(ObjectKind::Commit, data)
    }

    fn line(text: &str) -> Vec<u8> {
        pkt_line(format!("{text}\n").as_bytes()).unwrap()
    }

    #[test]
    fn parses_wants_ignoring_negotiation() {
        let a = oid(b"first");
        let b = oid(b"second");
        let mut body = line(&format!("want {} ofs-delta", a.to_hex()));
        body.extend_from_slice(&line(&format!("want {}", b.to_hex())));
        body.extend_from_slice(FLUSH_PKT);
        body.extend_from_slice(&line(&format!("have {}", oid(b"has").to_hex())));
        body.extend_from_slice(&line("done"));

        let request = parse_upload_request(&body).unwrap();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(request.wants, expected);
    }

    #[test]
    fn duplicate_wants_collapse() {
        let id = oid(b"tip");
        let mut body = line(&format!("want {}", id.to_hex()));
        body.extend_from_slice(&line(&format!("want {}", id.to_hex())));
        body.extend_from_slice(FLUSH_PKT);
        assert_eq!(parse_upload_request(&body).unwrap().wants, vec![id]);
    }

    #[test]
    fn garbage_line_is_rejected() {
        let body = line("gimme everything");
        assert!(matches!(
            parse_upload_request(&body),
            Err(ProtocolError::BadLine { .. })
        ));
    }

    #[test]
    fn short_want_is_rejected() {
        let body = line("want abc123");
        assert!(parse_upload_request(&body).is_err());
    }

    #[test]
    fn nak_is_a_pkt_line() {
        assert_eq!(nak(), b"0008NAK\n");
    }
}
