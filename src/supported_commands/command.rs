use std::fmt;

use crate::{impl_command_ops, Command, CommandOps, Equipment};

/// Supported Commands - Command (0x88)
///
/// Requests the set of command codes the equipment accepts. The command
/// carries no payload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportedCommandsCommand {
    equipment: Equipment,
}

impl SupportedCommandsCommand {
    /// Creates a new [SupportedCommandsCommand] addressed to `equipment`.
    pub fn new(equipment: Equipment) -> Self {
        Self { equipment }
    }
}

impl_command_ops!(
    SupportedCommandsCommand,
    Command::SupportedCommands,
    [0u8; 0]
);

impl fmt::Display for SupportedCommandsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}"#, self.command())?;
        write!(f, "}}")
    }
}
