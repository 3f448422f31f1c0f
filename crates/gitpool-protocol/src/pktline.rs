//! pkt-line framing: a 4-hex-digit length prefix covering itself and the
//! payload, with `0000` as the flush packet.

use crate::error::{ProtocolError, ProtocolResult};

/// The flush packet.
pub const FLUSH_PKT: &[u8] = b"0000";

/// Largest payload a single pkt-line can carry (65520 minus the prefix).
pub const MAX_PKT_PAYLOAD: usize = 65516;

/// Encode one payload as a pkt-line.
pub fn pkt_line(payload: &[u8]) -> ProtocolResult<Vec<u8>> {
    if payload.len() > MAX_PKT_PAYLOAD {
        return Err(ProtocolError::Oversized(payload.len()));
    }
    let mut out = Vec::with_capacity(4 + payload.len());
    out.extend_from_slice(format!("{:04x}", payload.len() + 4).as_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// One decoded frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Pkt<'a> {
    Flush,
    Line(&'a [u8]),
}

/// Reads pkt-line frames off the front of a byte slice.
///
/// Whatever follows the consumed frames — a receive request's pack body —
/// stays available through [`PktReader::remainder`].
pub struct PktReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PktReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Decode the next frame, or `None` at end of input.
    pub fn next_pkt(&mut self) -> ProtocolResult<Option<Pkt<'a>>> {
        if self.pos == self.data.len() {
            return Ok(None);
        }
        if self.pos + 4 > self.data.len() {
            return Err(ProtocolError::BadPktLine("truncated length prefix".into()));
        }
        let prefix = &self.data[self.pos..self.pos + 4];
        let prefix_str = std::str::from_utf8(prefix)
            .map_err(|_| ProtocolError::BadPktLine("length prefix is not ASCII hex".into()))?;
        let len = usize::from_str_radix(prefix_str, 16)
            .map_err(|_| ProtocolError::BadPktLine(format!("bad length prefix {prefix_str:?}")))?;

        if len == 0 {
            self.pos += 4;
            return Ok(Some(Pkt::Flush));
        }
        if len < 4 {
            return Err(ProtocolError::BadPktLine(format!("reserved length {len}")));
        }
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(ProtocolError::BadPktLine("frame extends past input".into()));
        }
        let line = &self.data[self.pos + 4..end];
        self.pos = end;
        Ok(Some(Pkt::Line(line)))
    }

    /// Bytes not yet consumed by frame decoding.
    pub fn remainder(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

/// Accumulates pkt-lines into a response buffer.
#[derive(Default)]
pub struct PktWriter {
    buf: Vec<u8>,
}

impl PktWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_line(&mut self, payload: &[u8]) -> ProtocolResult<()> {
        self.buf.extend_from_slice(&pkt_line(payload)?);
        Ok(())
    }

    pub fn flush_pkt(&mut self) {
        self.buf.extend_from_slice(FLUSH_PKT);
    }

    /// Append raw bytes outside pkt-line framing (a pack body).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_known_line() {
        // From the protocol documentation: "0006a\n".
        assert_eq!(pkt_line(b"a\n").unwrap(), b"0006a\n");
        assert_eq!(pkt_line(b"").unwrap(), b"0004");
    }

    #[test]
    fn reader_decodes_lines_and_flush() {
        let mut data = Vec::new();
        data.extend_from_slice(&pkt_line(b"first\n").unwrap());
        data.extend_from_slice(&pkt_line(b"second\n").unwrap());
        data.extend_from_slice(FLUSH_PKT);
        data.extend_from_slice(b"PACK...");

        let mut reader = PktReader::new(&data);
        assert_eq!(reader.next_pkt().unwrap(), Some(Pkt::Line(b"first\n")));
        assert_eq!(reader.next_pkt().unwrap(), Some(Pkt::Line(b"second\n")));
        assert_eq!(reader.next_pkt().unwrap(), Some(Pkt::Flush));
        assert_eq!(reader.remainder(), b"PACK...");
    }

    #[test]
    fn reader_stops_at_end() {
        let data = pkt_line(b"only\n").unwrap();
        let mut reader = PktReader::new(&data);
        assert!(reader.next_pkt().unwrap().is_some());
        assert_eq!(reader.next_pkt().unwrap(), None);
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let mut data = pkt_line(b"truncated").unwrap();
        data.pop();
        let mut reader = PktReader::new(&data);
        assert!(reader.next_pkt().is_err());
    }

    #[test]
    fn reserved_lengths_are_rejected() {
        for prefix in [&b"0001"[..], b"0002", b"0003"] {
            let mut reader = PktReader::new(prefix);
            assert!(reader.next_pkt().is_err(), "prefix {prefix:?}");
        }
    }

    #[test]
    fn non_hex_prefix_is_rejected() {
        let mut reader = PktReader::new(b"zzzzpayload");
        assert!(reader.next_pkt().is_err());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = vec![b'x'; MAX_PKT_PAYLOAD + 1];
        assert!(matches!(
            pkt_line(&payload),
            Err(ProtocolError::Oversized(_))
        ));
    }

    proptest! {
        #[test]
        fn roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let encoded = pkt_line(&payload).unwrap();
            let mut reader = PktReader::new(&encoded);
            prop_assert_eq!(reader.next_pkt().unwrap(), Some(Pkt::Line(&payload[..])));
            prop_assert_eq!(reader.next_pkt().unwrap(), None);
        }
    }
}
