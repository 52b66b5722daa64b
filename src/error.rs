use std::{fmt, result};

use crate::Command;

pub type Result<T> = result::Result<T, Error>;

/// Envelope-level violations detected while decoding a command frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProtocolError {
    /// Frame does not open with a recognized three-byte signature.
    BadSignature([u8; 3]),
    /// Checksum byte does not match the additive sum of the frame body.
    BadChecksum { expected: u8, got: u8 },
    /// The duplicated length fields disagree.
    LengthMismatch { length: u8, echo: u8 },
    /// The length fields disagree with the delivered frame size.
    FrameSizeMismatch { announced: usize, actual: usize },
    /// Frame shorter than the fixed envelope fields.
    ShortFrame(usize),
    /// Response carried a different command than the outstanding request.
    UnexpectedCommand { got: Command, expected: Command },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSignature(sig) => write!(f, "invalid signature: {sig:02x?}"),
            Self::BadChecksum { expected, got } => write!(
                f,
                "invalid checksum, expected: {expected:#04x}, have: {got:#04x}"
            ),
            Self::LengthMismatch { length, echo } => write!(
                f,
                "length fields disagree, first: {length}, echo: {echo}"
            ),
            Self::FrameSizeMismatch { announced, actual } => write!(
                f,
                "invalid frame size, announced: {announced}, have: {actual}"
            ),
            Self::ShortFrame(len) => write!(f, "frame too short: {len} bytes"),
            Self::UnexpectedCommand { got, expected } => write!(
                f,
                "unexpected command, expected: {expected}, have: {got}"
            ),
        }
    }
}

/// Chunk-level violations detected while splitting or reassembling frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FramingError {
    /// Encoded frame exceeds the single length byte of the chunk header.
    EnvelopeTooLong(usize),
    /// A chunk arrived with no reassembly in progress and no header marker.
    UnexpectedChunk(u8),
    /// Payload chunk index out of sequence.
    ChunkOrderViolation { expected: u8, got: u8 },
    /// Chunk shorter than its two framing bytes.
    ChunkTooShort(usize),
    /// Chunk announces a data length outside `1..=18`.
    ChunkLength(u8),
    /// Chunk announces more data bytes than it carries.
    TruncatedChunk { announced: u8, got: usize },
    /// Reassembled bytes exceed the length announced by the header.
    Overflow { expected: usize, got: usize },
    /// Final chunk arrived before the announced length was reached.
    Incomplete { expected: usize, got: usize },
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvelopeTooLong(len) => write!(f, "envelope too long to chunk: {len} bytes"),
            Self::UnexpectedChunk(first) => {
                write!(f, "unexpected chunk, first byte: {first:#04x}")
            }
            Self::ChunkOrderViolation { expected, got } => write!(
                f,
                "chunk out of order, expected index: {expected:#04x}, have: {got:#04x}"
            ),
            Self::ChunkTooShort(len) => write!(f, "chunk too short: {len} bytes"),
            Self::ChunkLength(len) => write!(f, "invalid chunk data length: {len}"),
            Self::TruncatedChunk { announced, got } => write!(
                f,
                "truncated chunk, announced: {announced} bytes, have: {got}"
            ),
            Self::Overflow { expected, got } => write!(
                f,
                "reassembly overflow, expected: {expected} bytes, have: {got}"
            ),
            Self::Incomplete { expected, got } => write!(
                f,
                "message ended early, expected: {expected} bytes, have: {got}"
            ),
        }
    }
}

/// Basic error type for protocol and session failures.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Transport operation failed, with the collaborator's opaque cause.
    Transport(String),
    /// Connection dropped mid-session.
    TransportLost,
    /// Chunk-level framing violation.
    Framing(FramingError),
    /// Envelope-level violation.
    Protocol(ProtocolError),
    /// Response referenced a characteristic missing from the catalog.
    UnknownCharacteristic(u8),
    /// Caller attempted to write a read-only characteristic.
    NotWritable(u8),
    /// Converter rejected an input value.
    ValueOutOfRange { name: &'static str, value: f64 },
    /// Decoder rejected input bytes.
    MalformedValue { name: &'static str, raw: Vec<u8> },
    /// Enable response did not contain `RESPONSE_OK`.
    AuthenticationFailed,
    /// Response deadline exceeded.
    Timeout,
    /// Caller cancelled before completion.
    Cancelled,
    /// Generic failure code.
    Failure(String),
}

impl Error {
    /// Create a generic failure Error
    pub fn failure<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Failure(message.into())
    }

    /// Create a transport failure Error
    pub fn transport<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Transport(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(cause) => write!(f, "transport error: {cause}"),
            Self::TransportLost => write!(f, "transport lost"),
            Self::Framing(err) => write!(f, "framing error: {err}"),
            Self::Protocol(err) => write!(f, "protocol error: {err}"),
            Self::UnknownCharacteristic(id) => write!(f, "unknown characteristic: {id}"),
            Self::NotWritable(id) => write!(f, "characteristic not writable: {id}"),
            Self::ValueOutOfRange { name, value } => {
                write!(f, "value out of range for {name}: {value}")
            }
            Self::MalformedValue { name, raw } => {
                write!(f, "malformed {name} value: {raw:02x?}")
            }
            Self::AuthenticationFailed => write!(f, "authentication failed"),
            Self::Timeout => write!(f, "response timed out"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Failure(message) => write!(f, "failure: {message}"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

impl From<FramingError> for Error {
    fn from(err: FramingError) -> Self {
        Self::Framing(err)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::failure(format!("Utf8 error: {err}"))
    }
}
