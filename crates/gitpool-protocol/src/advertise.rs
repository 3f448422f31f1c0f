//! Ref advertisement: the response body of `info/refs`.

use gitpool_types::ObjectId;

use crate::error::ProtocolResult;
use crate::pktline::PktWriter;
use crate::service::Service;

/// One ref as the advertisement presents it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvertisedRef {
    pub name: String,
    pub id: ObjectId,
    /// Dereferenced object for a tag ref, when the local cache knows it.
    pub peeled: Option<ObjectId>,
}

impl AdvertisedRef {
    pub fn new(name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            id,
            peeled: None,
        }
    }

    pub fn with_peeled(mut self, peeled: ObjectId) -> Self {
        self.peeled = Some(peeled);
        self
    }
}

/// The smart-HTTP service banner: `# service=<svc>` followed by a flush.
pub fn service_banner(service: Service) -> ProtocolResult<Vec<u8>> {
    let mut writer = PktWriter::new();
    writer.write_line(format!("# service={}\n", service.name()).as_bytes())?;
    writer.flush_pkt();
    Ok(writer.into_bytes())
}

/// Render the ref advertisement payload.
///
/// The first line carries the service's capability list after a NUL. An
/// empty repository still advertises: a single zero-id `capabilities^{}`
/// line. Peeled entries follow their ref as `<name>^{}` lines.
pub fn ref_advertisement(service: Service, refs: &[AdvertisedRef]) -> ProtocolResult<Vec<u8>> {
    let mut writer = PktWriter::new();
    if refs.is_empty() {
        writer.write_line(
            format!(
                "{} capabilities^{{}}\0{}\n",
                ObjectId::zero().to_hex(),
                service.capabilities()
            )
            .as_bytes(),
        )?;
    } else {
        for (index, r) in refs.iter().enumerate() {
            if index == 0 {
                writer.write_line(
                    format!("{} {}\0{}\n", r.id.to_hex(), r.name, service.capabilities())
                        .as_bytes(),
                )?;
            } else {
                writer.write_line(format!("{} {}\n", r.id.to_hex(), r.name).as_bytes())?;
            }
            if let Some(peeled) = r.peeled {
                writer.write_line(format!("{} {}^{{}}\n", peeled.to_hex(), r.name).as_bytes())?;
            }
        }
    }
    writer.flush_pkt();
    Ok(writer.into_bytes())
}
