use std::fmt;

use crate::error::ProtocolError;

/// The two transfer services a repository speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    /// Client fetches: requests objects reachable from requested refs.
    UploadPack,
    /// Client pushes: streams a pack, then updates refs.
    ReceivePack,
}

impl Service {
    /// Parse a wire service name. Anything but the two supported names is
    /// the typed unsupported-service error.
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        match name {
            "git-upload-pack" => Ok(Self::UploadPack),
            "git-receive-pack" => Ok(Self::ReceivePack),
            other => Err(ProtocolError::UnsupportedService(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::UploadPack => "git-upload-pack",
            Self::ReceivePack => "git-receive-pack",
        }
    }

    /// Content type of the `info/refs` advertisement response.
    pub fn advertisement_content_type(self) -> String {
        format!("application/x-{}-advertisement", self.name())
    }

    /// Content type of the service POST response.
    pub fn result_content_type(self) -> String {
        format!("application/x-{}-result", self.name())
    }

    /// Capabilities advertised on the first ref line.
    pub fn capabilities(self) -> &'static str {
        match self {
            Self::UploadPack => "ofs-delta",
            Self::ReceivePack => "report-status delete-refs ofs-delta",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
