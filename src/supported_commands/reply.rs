use std::collections::BTreeSet;
use std::fmt;

use crate::{Command, Envelope, Error, ProtocolError, Result};

mod index {
    pub const COUNT: usize = 0;
    pub const COMMANDS: usize = 1;
}

/// Supported Commands - Reply (0x88)
///
/// Mirrors the Supported Capabilities reply: a count byte followed by that
/// many command code bytes. Codes outside the documented set decode to
/// [Command::Reserved](crate::Command::Reserved).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupportedCommandsReply {
    commands: BTreeSet<Command>,
}

impl SupportedCommandsReply {
    /// Gets the set of commands the equipment accepts.
    pub fn commands(&self) -> &BTreeSet<Command> {
        &self.commands
    }

    /// Consumes the reply, returning the accepted command set.
    pub fn into_commands(self) -> BTreeSet<Command> {
        self.commands
    }
}

impl TryFrom<&Envelope> for SupportedCommandsReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::SupportedCommands {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::SupportedCommands,
            }
            .into());
        }

        let payload = envelope.payload();
        let count = *payload.get(index::COUNT).ok_or(Error::MalformedValue {
            name: "SupportedCommands",
            raw: payload.to_vec(),
        })? as usize;

        let commands = payload
            .get(index::COMMANDS..index::COMMANDS + count)
            .ok_or(Error::MalformedValue {
                name: "SupportedCommands",
                raw: payload.to_vec(),
            })?
            .iter()
            .map(|&b| Command::from(b))
            .collect();

        Ok(Self { commands })
    }
}

impl fmt::Display for SupportedCommandsReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""commands": ["#)?;
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, r#""{command}""#)?;
        }
        write!(f, "]}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Equipment;

    #[test]
    fn test_supported_commands_reply_from_envelope() -> Result<()> {
        let envelope = Envelope::new(
            Equipment::Treadmill,
            Command::SupportedCommands,
            vec![0x04, 0x02, 0x80, 0x81, 0x90],
        );

        let reply = SupportedCommandsReply::try_from(&envelope)?;
        let expected: BTreeSet<Command> = [
            Command::WriteAndRead,
            Command::SupportedCapabilities,
            Command::EquipmentInformation,
            Command::Enable,
        ]
        .iter()
        .copied()
        .collect();

        assert_eq!(reply.commands(), &expected);

        Ok(())
    }

    #[test]
    fn test_supported_commands_reply_unknown_code() -> Result<()> {
        let envelope = Envelope::new(
            Equipment::Treadmill,
            Command::SupportedCommands,
            vec![0x02, 0x02, 0x77],
        );

        let reply = SupportedCommandsReply::try_from(&envelope)?;

        assert!(reply.commands().contains(&Command::Reserved));

        Ok(())
    }
}
