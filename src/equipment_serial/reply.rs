use std::fmt;

use crate::{Command, Envelope, Error, ProtocolError, Result};

/// Offsets inherited from protocol captures, in raw-frame coordinates
/// (signature byte 0). Track firmware revisions here.
mod index {
    use crate::index::PAYLOAD;

    pub const SERIAL_LEN_RAW: usize = 8;

    pub const SERIAL_LEN: usize = SERIAL_LEN_RAW - PAYLOAD;
    pub const SERIAL: usize = SERIAL_LEN + 1;
}

/// Equipment Serial - Reply (0x95)
///
/// Carries the serial number as length-prefixed ASCII at a fixed offset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquipmentSerialReply {
    serial: String,
}

impl EquipmentSerialReply {
    /// Gets the serial number string.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Consumes the reply, returning the serial number string.
    pub fn into_serial(self) -> String {
        self.serial
    }
}

impl TryFrom<&Envelope> for EquipmentSerialReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::EquipmentSerial {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::EquipmentSerial,
            }
            .into());
        }

        let payload = envelope.payload();
        let len = *payload.get(index::SERIAL_LEN).ok_or(Error::MalformedValue {
            name: "EquipmentSerial",
            raw: payload.to_vec(),
        })? as usize;

        let ascii = payload
            .get(index::SERIAL..index::SERIAL + len)
            .ok_or(Error::MalformedValue {
                name: "EquipmentSerial",
                raw: payload.to_vec(),
            })?;

        let serial = std::str::from_utf8(ascii)
            .map_err(|_| Error::MalformedValue {
                name: "EquipmentSerial",
                raw: ascii.to_vec(),
            })?
            .to_string();

        Ok(Self { serial })
    }
}

impl fmt::Display for EquipmentSerialReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""serial": "{}""#, self.serial)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Equipment;

    #[test]
    #[rustfmt::skip]
    fn test_equipment_serial_reply_from_envelope() -> Result<()> {
        // Length byte at raw offset 8, then that many ASCII bytes
        let payload = vec![
            0x02,
            0x06,
            b'A', b'B', b'1', b'2', b'3', b'4',
            0x00, 0x00,
        ];
        let envelope = Envelope::new(Equipment::Treadmill, Command::EquipmentSerial, payload);

        let reply = EquipmentSerialReply::try_from(&envelope)?;

        assert_eq!(reply.serial(), "AB1234");

        Ok(())
    }

    #[test]
    fn test_equipment_serial_reply_length_overruns_frame() {
        let envelope = Envelope::new(
            Equipment::Treadmill,
            Command::EquipmentSerial,
            vec![0x02, 0x0a, b'A'],
        );

        assert!(matches!(
            EquipmentSerialReply::try_from(&envelope),
            Err(Error::MalformedValue { .. })
        ));
    }
}
