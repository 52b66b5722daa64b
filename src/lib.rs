//! # iFit BLE Protocol
//!
//! This crate implements the iFit BLE protocol messages, and related types for communication with iFit fitness equipment over a GATT characteristic pair.
//!
//! Every exchange crosses three framing layers: a command envelope with an additive checksum, carried inside 20-byte GATT chunks, with typed values laid out by variable-length ID bitmaps. The modules in this crate mirror those layers:
//!
//! - [envelope]: the command envelope, signature through checksum
//! - [chunk]: splitting envelopes into GATT writes and reassembling notifications
//! - [catalog] / [convert] / [bitmap]: the characteristic table and its typed value codecs
//! - [session]: request/response correlation, authentication, and the high-level operations
//!
//! If adding a new message, please follow the existing pattern of placing `...Command` (host-initiated) messages in `<message-type>/command.rs` files, and `...Reply` (equipment-initiated) messages in `<message-type>/reply.rs` files.
//!
//! All command types implement [CommandOps]; reply types parse from a decoded [Envelope] with `TryFrom`.
//!
//! The BLE stack itself is out of scope: collaborators implement the [Transport](transport::Transport) trait and hand the session a notification channel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length-prefixed ID-set bitmaps
pub mod bitmap;
/// The static characteristic table
pub mod catalog;
/// GATT MTU chunking and reassembly
pub mod chunk;
/// Typed value converters
pub mod convert;
/// The command envelope codec
pub mod envelope;
/// Library error types
pub mod error;
/// Logging convenience helpers
pub mod logging;
mod macros;
/// Request/response session and high-level operations
pub mod session;
/// The BLE transport boundary
pub mod transport;
/// Characteristic value types
pub mod value;

pub use bitmap::*;
pub use chunk::{Reassembler, EOF_INDEX, HEADER_MARKER, MAX_CHUNK};
pub use convert::*;
pub use envelope::Envelope;
pub use error::{Error, FramingError, ProtocolError, Result};
pub use logging::*;
pub use session::*;
pub use transport::*;
pub use value::*;

pub use catalog::Characteristic;

/// Enable - Command (0x90), Reply
pub mod enable;
/// Equipment Firmware - Command (0x84), Reply
pub mod equipment_firmware;
/// Equipment Information - Command (0x81), Reply
pub mod equipment_information;
/// Equipment Reference - Command (0x82), Reply
pub mod equipment_reference;
/// Equipment Serial - Command (0x95), Reply
pub mod equipment_serial;
/// Supported Capabilities - Command (0x80), Reply
pub mod supported_capabilities;
/// Supported Commands - Command (0x88), Reply
pub mod supported_commands;
/// Write And Read - Command (0x02), Reply
pub mod write_read;

pub use enable::*;
pub use equipment_firmware::*;
pub use equipment_information::*;
pub use equipment_reference::*;
pub use equipment_serial::*;
pub use supported_capabilities::*;
pub use supported_commands::*;
pub use write_read::*;

/// Signature opening every host-initiated frame
pub const SIGNATURE: [u8; 3] = [0x02, 0x04, 0x02];
/// Alternate signature observed on equipment-initiated frames
pub const RESPONSE_SIGNATURE: [u8; 3] = [0x01, 0x04, 0x02];
/// First payload byte of an affirmative reply
pub const RESPONSE_OK: u8 = 0x02;

/// Calculate the additive checksum of a byte range
///
/// This range should be the first length byte through the last payload byte,
/// i.e. every frame byte after the three-byte signature.
pub fn checksum(data: &[u8]) -> u8 {
    let mut sum = 0u8;
    data.iter().for_each(|&b| sum = sum.wrapping_add(b));
    sum
}

/// Equipment class addressed in byte 4 of every envelope.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Equipment {
    General = 0x02,
    Treadmill = 0x04,
    /// Device-type echo seen in some response streams; never sent by a client
    DeviceEcho = 0x07,
    /// Variant to represent unrecognized values
    Reserved = 0xff,
}

impl From<u8> for Equipment {
    fn from(b: u8) -> Self {
        match b {
            0x02 => Self::General,
            0x04 => Self::Treadmill,
            0x07 => Self::DeviceEcho,
            _ => Self::Reserved,
        }
    }
}

impl From<Equipment> for u8 {
    fn from(e: Equipment) -> Self {
        e as u8
    }
}

impl From<&Equipment> for u8 {
    fn from(e: &Equipment) -> Self {
        (*e).into()
    }
}

impl From<Equipment> for &'static str {
    fn from(e: Equipment) -> Self {
        match e {
            Equipment::General => "General",
            Equipment::Treadmill => "Treadmill",
            Equipment::DeviceEcho => "DeviceEcho",
            Equipment::Reserved => "Reserved",
        }
    }
}

impl From<&Equipment> for &'static str {
    fn from(e: &Equipment) -> Self {
        (*e).into()
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(self))
    }
}

/// Operation code in byte 6 of every envelope.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Command {
    /// General-purpose write/read exchange, see [WriteReadCommand](crate::WriteReadCommand)
    WriteAndRead = 0x02,
    /// Calibration trigger; recognized but without a documented exchange shape
    Calibrate = 0x06,
    /// Capability list query, see [SupportedCapabilitiesCommand](crate::SupportedCapabilitiesCommand)
    SupportedCapabilities = 0x80,
    /// Characteristic bitmap query, see [EquipmentInformationCommand](crate::EquipmentInformationCommand)
    EquipmentInformation = 0x81,
    /// Numeric reference query, see [EquipmentReferenceCommand](crate::EquipmentReferenceCommand)
    EquipmentReference = 0x82,
    /// Firmware version query, see [EquipmentFirmwareCommand](crate::EquipmentFirmwareCommand)
    EquipmentFirmware = 0x84,
    /// Command set query, see [SupportedCommandsCommand](crate::SupportedCommandsCommand)
    SupportedCommands = 0x88,
    /// Activation code submission, see [EnableCommand](crate::EnableCommand)
    Enable = 0x90,
    /// Serial number query, see [EquipmentSerialCommand](crate::EquipmentSerialCommand)
    EquipmentSerial = 0x95,
    /// Variant to represent unrecognized values
    Reserved = 0xff,
}

impl From<u8> for Command {
    fn from(b: u8) -> Self {
        match b {
            0x02 => Self::WriteAndRead,
            0x06 => Self::Calibrate,
            0x80 => Self::SupportedCapabilities,
            0x81 => Self::EquipmentInformation,
            0x82 => Self::EquipmentReference,
            0x84 => Self::EquipmentFirmware,
            0x88 => Self::SupportedCommands,
            0x90 => Self::Enable,
            0x95 => Self::EquipmentSerial,
            _ => Self::Reserved,
        }
    }
}

impl From<Command> for u8 {
    fn from(c: Command) -> Self {
        c as u8
    }
}

impl From<&Command> for u8 {
    fn from(c: &Command) -> Self {
        (*c).into()
    }
}

impl From<Command> for &'static str {
    fn from(c: Command) -> Self {
        match c {
            Command::WriteAndRead => "WriteAndRead",
            Command::Calibrate => "Calibrate",
            Command::SupportedCapabilities => "SupportedCapabilities",
            Command::EquipmentInformation => "EquipmentInformation",
            Command::EquipmentReference => "EquipmentReference",
            Command::EquipmentFirmware => "EquipmentFirmware",
            Command::SupportedCommands => "SupportedCommands",
            Command::Enable => "Enable",
            Command::EquipmentSerial => "EquipmentSerial",
            Command::Reserved => "Reserved",
        }
    }
}

impl From<&Command> for &'static str {
    fn from(c: &Command) -> Self {
        (*c).into()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(self))
    }
}

pub(crate) mod index {
    pub const LEN: usize = 3;
    pub const EQUIPMENT: usize = 4;
    pub const LEN_ECHO: usize = 5;
    pub const COMMAND: usize = 6;
    pub const PAYLOAD: usize = 7;
}

/// Generic functions for all host-initiated message types
pub trait CommandOps {
    /// Gets the equipment class the message addresses.
    fn equipment(&self) -> Equipment;

    /// Gets the operation code of the message.
    fn command(&self) -> Command;

    /// Builds the inner payload bytes.
    fn payload(&self) -> Result<Vec<u8>>;

    /// Builds the command envelope.
    fn envelope(&self) -> Result<Envelope> {
        Ok(Envelope::new(self.equipment(), self.command(), self.payload()?))
    }

    /// Encodes the full frame, signature through checksum.
    fn encode(&self) -> Result<Vec<u8>> {
        self.envelope()?.encode()
    }
}
