use std::fmt;

use crate::{Command, Envelope, Error, ProtocolError, Result};

/// Offsets inherited from protocol captures, in raw-frame coordinates
/// (signature byte 0). Track firmware revisions here.
mod index {
    use crate::index::PAYLOAD;

    pub const FIRMWARE_RAW: usize = 11;

    pub const FIRMWARE: usize = FIRMWARE_RAW - PAYLOAD;
}

/// Bytes terminating the firmware version string.
const TERMINATORS: [u8; 2] = [0x00, 0x01];

/// Equipment Firmware - Reply (0x84)
///
/// Carries the firmware version as ASCII starting at a fixed offset,
/// terminated by the first `0x00` or `0x01` byte (or the end of the frame).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquipmentFirmwareReply {
    firmware: String,
}

impl EquipmentFirmwareReply {
    /// Gets the firmware version string.
    pub fn firmware(&self) -> &str {
        &self.firmware
    }

    /// Consumes the reply, returning the firmware version string.
    pub fn into_firmware(self) -> String {
        self.firmware
    }
}

impl TryFrom<&Envelope> for EquipmentFirmwareReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::EquipmentFirmware {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::EquipmentFirmware,
            }
            .into());
        }

        let payload = envelope.payload();
        let ascii = payload
            .get(index::FIRMWARE..)
            .ok_or(Error::MalformedValue {
                name: "EquipmentFirmware",
                raw: payload.to_vec(),
            })?;

        let end = ascii
            .iter()
            .position(|b| TERMINATORS.contains(b))
            .unwrap_or(ascii.len());

        let firmware = std::str::from_utf8(&ascii[..end])
            .map_err(|_| Error::MalformedValue {
                name: "EquipmentFirmware",
                raw: ascii[..end].to_vec(),
            })?
            .to_string();

        Ok(Self { firmware })
    }
}

impl fmt::Display for EquipmentFirmwareReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""firmware": "{}""#, self.firmware)?;
        write!(f, "}}")
    }
}
