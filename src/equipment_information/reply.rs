use std::collections::BTreeSet;
use std::fmt;

use crate::{bitmap::decode_bitmap, Command, Envelope, Error, ProtocolError, Result};

/// Equipment Information - Reply (0x81)
///
/// The inner payload is a length-prefixed bitmap of the characteristic IDs
/// the equipment exposes: bit `k` of bitmap byte `i` marks ID `8*i + k`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquipmentInformationReply {
    characteristics: BTreeSet<u8>,
}

impl EquipmentInformationReply {
    /// Gets the set of characteristic IDs announced by the equipment.
    pub fn characteristics(&self) -> &BTreeSet<u8> {
        &self.characteristics
    }

    /// Consumes the reply, returning the announced ID set.
    pub fn into_characteristics(self) -> BTreeSet<u8> {
        self.characteristics
    }
}

impl TryFrom<&Envelope> for EquipmentInformationReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::EquipmentInformation {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::EquipmentInformation,
            }
            .into());
        }

        let (characteristics, _) = decode_bitmap(envelope.payload())?;

        Ok(Self { characteristics })
    }
}

impl fmt::Display for EquipmentInformationReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""characteristics": {:?}"#, self.characteristics)?;
        write!(f, "}}")
    }
}
