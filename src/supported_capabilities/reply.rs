use std::fmt;

use crate::{Command, Envelope, Error, ProtocolError, Result};

mod index {
    pub const COUNT: usize = 0;
    pub const CAPABILITIES: usize = 1;
}

/// Supported Capabilities - Reply (0x80)
///
/// The inner payload opens with a count byte followed by that many capability
/// ID bytes, in the order the equipment reports them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupportedCapabilitiesReply {
    capabilities: Vec<u8>,
}

impl SupportedCapabilitiesReply {
    /// Gets the reported capability IDs.
    pub fn capabilities(&self) -> &[u8] {
        &self.capabilities
    }

    /// Consumes the reply, returning the reported capability IDs.
    pub fn into_capabilities(self) -> Vec<u8> {
        self.capabilities
    }
}

impl TryFrom<&Envelope> for SupportedCapabilitiesReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::SupportedCapabilities {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::SupportedCapabilities,
            }
            .into());
        }

        let payload = envelope.payload();
        let count = *payload.get(index::COUNT).ok_or(Error::MalformedValue {
            name: "SupportedCapabilities",
            raw: payload.to_vec(),
        })? as usize;

        let capabilities = payload
            .get(index::CAPABILITIES..index::CAPABILITIES + count)
            .ok_or(Error::MalformedValue {
                name: "SupportedCapabilities",
                raw: payload.to_vec(),
            })?
            .to_vec();

        Ok(Self { capabilities })
    }
}

impl fmt::Display for SupportedCapabilitiesReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""capabilities": {:?}"#, self.capabilities)?;
        write!(f, "}}")
    }
}
