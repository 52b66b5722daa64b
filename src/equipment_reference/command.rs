use std::fmt;

use crate::{impl_command_ops, Command, CommandOps, Equipment};

/// Equipment Reference - Command (0x82)
///
/// Requests the equipment's numeric reference. The command carries the fixed
/// two-byte payload `00 00`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquipmentReferenceCommand {
    equipment: Equipment,
}

impl EquipmentReferenceCommand {
    /// Creates a new [EquipmentReferenceCommand] addressed to `equipment`.
    pub fn new(equipment: Equipment) -> Self {
        Self { equipment }
    }
}

impl_command_ops!(
    EquipmentReferenceCommand,
    Command::EquipmentReference,
    [0x00u8, 0x00]
);

impl fmt::Display for EquipmentReferenceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}"#, self.command())?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    #[test]
    #[rustfmt::skip]
    fn test_equipment_reference_command_encode() -> Result<()> {
        let msg = EquipmentReferenceCommand::new(Equipment::Treadmill);

        let expected = [
            // Signature
            0x02, 0x04, 0x02,
            // LEN | EQ | LEN | CMD
            0x06, 0x04, 0x06, 0x82,
            // Data
            0x00, 0x00,
            // Checksum
            0x92,
        ];

        assert_eq!(msg.encode()?, expected.to_vec());

        Ok(())
    }
}
