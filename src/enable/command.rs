use std::fmt;

use crate::{Command, CommandOps, Equipment, Result};

/// Byte length of an activation code.
pub const ACTIVATION_CODE_LEN: usize = 36;

/// Enable - Command (0x90)
///
/// Submits a 36-byte activation code to unlock control of the equipment. The
/// code is opaque to the protocol core; producing and persisting codes
/// belongs to external collaborators.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnableCommand {
    equipment: Equipment,
    code: [u8; ACTIVATION_CODE_LEN],
}

impl EnableCommand {
    /// Creates a new [EnableCommand] carrying `code`.
    pub fn new(equipment: Equipment, code: [u8; ACTIVATION_CODE_LEN]) -> Self {
        Self { equipment, code }
    }

    /// Gets the activation code.
    pub fn code(&self) -> &[u8; ACTIVATION_CODE_LEN] {
        &self.code
    }
}

impl CommandOps for EnableCommand {
    fn equipment(&self) -> Equipment {
        self.equipment
    }

    fn command(&self) -> Command {
        Command::Enable
    }

    fn payload(&self) -> Result<Vec<u8>> {
        Ok(self.code.to_vec())
    }
}

impl fmt::Display for EnableCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}, "#, self.command())?;
        // Codes are secrets; log the length only
        write!(f, r#""code_len": {}"#, self.code.len())?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chunk, envelope};

    #[test]
    fn test_enable_command_encode() -> Result<()> {
        let code = [0x5au8; ACTIVATION_CODE_LEN];
        let msg = EnableCommand::new(Equipment::Treadmill, code);

        let frame = msg.encode()?;

        assert_eq!(frame.len(), ACTIVATION_CODE_LEN + envelope::METADATA);
        assert_eq!(frame[6], 0x90);
        assert_eq!(&frame[7..7 + ACTIVATION_CODE_LEN], code.as_ref());

        // A 44-byte frame crosses the MTU in three data chunks
        let chunks = chunk::chunk(&frame)?;
        assert_eq!(chunks.len(), 4);

        Ok(())
    }
}
