use std::fmt;

use crate::{impl_command_ops, Command, CommandOps, Equipment};

/// Equipment Information - Command (0x81)
///
/// Requests the bitmap of characteristic IDs the equipment exposes.
///
/// The command carries no payload:
///
/// | Name  | SIG      | LEN  | EQ   | LEN  | CMD  | CHK |
/// |:------|:--------:|:----:|:----:|:----:|:----:|:---:|
/// | Value | 02 04 02 | 0x04 | eq   | 0x04 | 0x81 | zz  |
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquipmentInformationCommand {
    equipment: Equipment,
}

impl EquipmentInformationCommand {
    /// Creates a new [EquipmentInformationCommand] addressed to `equipment`.
    pub fn new(equipment: Equipment) -> Self {
        Self { equipment }
    }
}

impl_command_ops!(
    EquipmentInformationCommand,
    Command::EquipmentInformation,
    [0u8; 0]
);

impl fmt::Display for EquipmentInformationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}"#, self.command())?;
        write!(f, "}}")
    }
}
