use std::fmt;

use crate::{impl_command_ops, Command, CommandOps, Equipment};

/// Equipment Firmware - Command (0x84)
///
/// Requests the firmware version string. The command carries the fixed
/// two-byte payload `00 00`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquipmentFirmwareCommand {
    equipment: Equipment,
}

impl EquipmentFirmwareCommand {
    /// Creates a new [EquipmentFirmwareCommand] addressed to `equipment`.
    pub fn new(equipment: Equipment) -> Self {
        Self { equipment }
    }
}

impl_command_ops!(
    EquipmentFirmwareCommand,
    Command::EquipmentFirmware,
    [0x00u8, 0x00]
);

impl fmt::Display for EquipmentFirmwareCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}"#, self.command())?;
        write!(f, "}}")
    }
}
