//! Receive side: the client's ref-update commands and the server's
//! report-status reply.

use gitpool_types::ObjectId;

use crate::error::{ProtocolError, ProtocolResult};
use crate::pktline::{Pkt, PktReader, PktWriter};

/// One requested ref transition: `<old-id> <new-id> <name>`.
///
/// A zero old id asks to create the ref, a zero new id to delete it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefCommand {
    pub old: ObjectId,
    pub new: ObjectId,
    pub name: String,
}

impl RefCommand {
    pub fn is_create(&self) -> bool {
        self.old.is_zero()
    }

    pub fn is_delete(&self) -> bool {
        self.new.is_zero()
    }
}

/// A parsed receive request: command list, client capabilities, and the
/// raw pack body that followed the flush packet.
#[derive(Debug)]
pub struct ReceiveRequest {
    pub commands: Vec<RefCommand>,
    pub capabilities: Vec<String>,
    pub pack: Vec<u8>,
}

fn bad_line(line: &[u8]) -> ProtocolError {
    ProtocolError::BadLine {
        kind: "ref-update",
        line: String::from_utf8_lossy(line).into_owned(),
    }
}

fn parse_command(line: &[u8]) -> ProtocolResult<RefCommand> {
    // "<40-hex> <40-hex> <name>", newline optional.
    let line = match line.last() {
        Some(b'\n') => &line[..line.len() - 1],
        _ => line,
    };
    if line.len() < 82 || line[40] != b' ' || line[81] != b' ' {
        return Err(bad_line(line));
    }
    let old = ObjectId::from_any(&line[..40]).map_err(|_| bad_line(line))?;
    let new = ObjectId::from_any(&line[41..81]).map_err(|_| bad_line(line))?;
    let name = std::str::from_utf8(&line[82..])
        .map_err(|_| bad_line(line))?
        .to_string();
    if name.is_empty() {
        return Err(bad_line(line));
    }
    Ok(RefCommand { old, new, name })
}

/// Parse a receive-pack request body.
///
/// Commands come as pkt-lines up to a flush; the first line may carry
/// client capabilities after a NUL. Everything after the flush is the
/// pack stream, which may be absent for a pure-deletion push.
pub fn parse_receive_request(body: &[u8]) -> ProtocolResult<ReceiveRequest> {
    let mut reader = PktReader::new(body);
    let mut commands = Vec::new();
    let mut capabilities = Vec::new();

    while let Some(pkt) = reader.next_pkt()? {
        match pkt {
            Pkt::Flush => break,
            Pkt::Line(line) => {
                let (command, caps) = match line.iter().position(|&b| b == 0) {
                    Some(nul) => (&line[..nul], Some(&line[nul + 1..])),
                    None => (line, None),
                };
                if let Some(caps) = caps {
                    if !commands.is_empty() {
                        return Err(bad_line(line));
                    }
                    capabilities = String::from_utf8_lossy(caps)
                        .split_whitespace()
                        .map(str::to_string)
                        .collect();
                }
                commands.push(parse_command(command)?);
            }
        }
    }

    Ok(ReceiveRequest {
        commands,
        capabilities,
        pack: reader.remainder().to_vec(),
    })
}

/// Render a report-status response.
///
/// `unpack_error` is `None` for `unpack ok`; each ref result is the
/// command's name with `None` for `ok` or a reason for `ng`.
pub fn report_status(
    unpack_error: Option<&str>,
    ref_results: &[(String, Option<String>)],
) -> ProtocolResult<Vec<u8>> {
    let mut writer = PktWriter::new();
    match unpack_error {
        None => writer.write_line(b"unpack ok\n")?,
        Some(err) => writer.write_line(format!("unpack {err}\n").as_bytes())?,
    }
    for (name, error) in ref_results {
        match error {
            None => writer.write_line(format!("ok {name}\n").as_bytes())?,
            Some(reason) => writer.write_line(format!("ng {name} {reason}\n").as_bytes())?,
        }
    }
    writer.flush_pkt();
    Ok(writer.into_bytes())
}
