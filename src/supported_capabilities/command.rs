use std::fmt;

use crate::{impl_command_ops, Command, CommandOps, Equipment};

/// Supported Capabilities - Command (0x80)
///
/// Requests the list of capability IDs the equipment implements. The command
/// carries no payload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportedCapabilitiesCommand {
    equipment: Equipment,
}

impl SupportedCapabilitiesCommand {
    /// Creates a new [SupportedCapabilitiesCommand] addressed to `equipment`.
    pub fn new(equipment: Equipment) -> Self {
        Self { equipment }
    }
}

impl_command_ops!(
    SupportedCapabilitiesCommand,
    Command::SupportedCapabilities,
    [0u8; 0]
);

impl fmt::Display for SupportedCapabilitiesCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}"#, self.command())?;
        write!(f, "}}")
    }
}
