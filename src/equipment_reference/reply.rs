use std::fmt;

use crate::{Command, Envelope, Error, ProtocolError, Result};

/// Offsets inherited from protocol captures, in raw-frame coordinates
/// (signature byte 0). Track firmware revisions here.
mod index {
    use crate::index::PAYLOAD;

    pub const REFERENCE_RAW: usize = 15;
    pub const REFERENCE_END_RAW: usize = 19;

    pub const REFERENCE: usize = REFERENCE_RAW - PAYLOAD;
    pub const REFERENCE_END: usize = REFERENCE_END_RAW - PAYLOAD;
}

/// Equipment Reference - Reply (0x82)
///
/// Carries the equipment's numeric reference as a little-endian `u32` at a
/// fixed offset in the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EquipmentReferenceReply {
    reference: u32,
}

impl EquipmentReferenceReply {
    /// Gets the numeric equipment reference.
    pub fn reference(&self) -> u32 {
        self.reference
    }
}

impl TryFrom<&Envelope> for EquipmentReferenceReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::EquipmentReference {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::EquipmentReference,
            }
            .into());
        }

        let payload = envelope.payload();
        let raw = payload
            .get(index::REFERENCE..index::REFERENCE_END)
            .ok_or(Error::MalformedValue {
                name: "EquipmentReference",
                raw: payload.to_vec(),
            })?;

        Ok(Self {
            reference: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
        })
    }
}

impl fmt::Display for EquipmentReferenceReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""reference": {}"#, self.reference)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Equipment;

    #[test]
    #[rustfmt::skip]
    fn test_equipment_reference_reply_from_envelope() -> Result<()> {
        // Reference bytes 2c fe 05 00 at raw offsets 15..19
        let payload = vec![
            0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x2c, 0xfe, 0x05, 0x00,
        ];
        let envelope = Envelope::new(Equipment::Treadmill, Command::EquipmentReference, payload);

        let reply = EquipmentReferenceReply::try_from(&envelope)?;

        assert_eq!(reply.reference(), 392_748);

        Ok(())
    }

    #[test]
    fn test_equipment_reference_reply_short_payload() {
        let envelope = Envelope::new(
            Equipment::Treadmill,
            Command::EquipmentReference,
            vec![0x02, 0x00, 0x00],
        );

        assert!(matches!(
            EquipmentReferenceReply::try_from(&envelope),
            Err(Error::MalformedValue { .. })
        ));
    }
}
