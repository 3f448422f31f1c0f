//! Smart transfer protocol plumbing.
//!
//! The wire format between a repository server and its clients: length-
//! prefixed pkt-lines, the two service names, ref advertisements, the
//! receive side's command list + report-status, and the upload side's
//! want list. The dispatcher composes these; nothing here touches
//! storage.

pub mod advertise;
pub mod error;
pub mod pktline;
pub mod receive;
pub mod service;
pub mod upload;

pub use advertise::{ref_advertisement, service_banner, AdvertisedRef};
pub use error::{ProtocolError, ProtocolResult};
pub use pktline::{pkt_line, Pkt, PktReader, PktWriter, FLUSH_PKT, MAX_PKT_PAYLOAD};
pub use receive::{parse_receive_request, report_status, RefCommand, ReceiveRequest};
pub use service::Service;
pub use upload::{nak, parse_upload_request, UploadRequest};
