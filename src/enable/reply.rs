use std::fmt;

use crate::{Command, Envelope, Error, ProtocolError, Result, RESPONSE_OK};

mod index {
    pub const RESPONSE: usize = 0;
}

/// Enable - Reply (0x90)
///
/// The first payload byte reports whether the activation code was accepted:
/// [RESPONSE_OK] on success, anything else rejects the code.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnableReply {
    response: u8,
}

impl EnableReply {
    /// Gets the raw response byte.
    pub fn response(&self) -> u8 {
        self.response
    }

    /// Gets whether the activation code was accepted.
    pub fn is_ok(&self) -> bool {
        self.response == RESPONSE_OK
    }
}

impl TryFrom<&Envelope> for EnableReply {
    type Error = Error;

    fn try_from(envelope: &Envelope) -> Result<Self> {
        if envelope.command() != Command::Enable {
            return Err(ProtocolError::UnexpectedCommand {
                got: envelope.command(),
                expected: Command::Enable,
            }
            .into());
        }

        let payload = envelope.payload();
        let response = *payload.get(index::RESPONSE).ok_or(Error::MalformedValue {
            name: "Enable",
            raw: payload.to_vec(),
        })?;

        Ok(Self { response })
    }
}

impl fmt::Display for EnableReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""response": {:#04x}, "#, self.response)?;
        write!(f, r#""ok": {}"#, self.is_ok())?;
        write!(f, "}}")
    }
}
