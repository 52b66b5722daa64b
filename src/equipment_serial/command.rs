use std::fmt;

use crate::{impl_command_ops, Command, CommandOps, Equipment};

/// Equipment Serial - Command (0x95)
///
/// Requests the serial number string. The command carries the fixed two-byte
/// payload `00 00`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquipmentSerialCommand {
    equipment: Equipment,
}

impl EquipmentSerialCommand {
    /// Creates a new [EquipmentSerialCommand] addressed to `equipment`.
    pub fn new(equipment: Equipment) -> Self {
        Self { equipment }
    }
}

impl_command_ops!(
    EquipmentSerialCommand,
    Command::EquipmentSerial,
    [0x00u8, 0x00]
);

impl fmt::Display for EquipmentSerialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}"#, self.command())?;
        write!(f, "}}")
    }
}
