use std::fmt;

use crate::{
    checksum, index, Command, Equipment, FramingError, ProtocolError, Result, RESPONSE_SIGNATURE,
    SIGNATURE,
};

/// Framing overhead per envelope: signature (3), length, equipment, length
/// echo, command, checksum.
pub const METADATA: usize = 8;

/// Longest inner payload representable by the one-byte length field.
///
/// The length field encodes `payload + LEN_BIAS`.
pub const MAX_PAYLOAD: usize = u8::MAX as usize - LEN_BIAS;

/// Bias between the length field and the payload byte count.
pub const LEN_BIAS: usize = 4;

/// Logical view of a decoded command frame.
///
/// The envelope is the unit of checksum verification. The frame is laid out
/// as follows:
///
/// | Name  | SIG          | LEN  | EQ   | LEN  | CMD  | Data 0..N | CHK |
/// |:------|:------------:|:----:|:----:|:----:|:----:|:---------:|:---:|
/// | Byte  | 0 1 2        | 3    | 4    | 5    | 6    | 7..7+N    | 7+N |
/// | Value | 02 04 02     | N+4  | eq   | N+4  | cmd  | nn        | zz  |
///
/// Inbound frames may open with the response marker `01 04 02` instead; both
/// signatures are accepted on decode, and `02 04 02` is always emitted on
/// encode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Envelope {
    equipment: Equipment,
    command: Command,
    payload: Vec<u8>,
}

impl Envelope {
    /// Creates a new [Envelope].
    pub fn new(equipment: Equipment, command: Command, payload: Vec<u8>) -> Self {
        Self {
            equipment,
            command,
            payload,
        }
    }

    /// Gets the equipment class addressed by the frame.
    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    /// Gets the operation code.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Gets the inner payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the envelope, returning the inner payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Gets the total frame length, signature through checksum.
    pub fn frame_len(&self) -> usize {
        self.payload.len() + METADATA
    }

    /// Encode the frame, signature through checksum.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.payload.len() > MAX_PAYLOAD {
            return Err(FramingError::EnvelopeTooLong(self.frame_len()).into());
        }

        let len = (self.payload.len() + LEN_BIAS) as u8;
        let mut buf = Vec::with_capacity(self.frame_len());

        buf.extend_from_slice(&SIGNATURE);
        buf.push(len);
        buf.push(self.equipment.into());
        buf.push(len);
        buf.push(self.command.into());
        buf.extend_from_slice(&self.payload);

        let chk = checksum(&buf[index::LEN..]);
        buf.push(chk);

        Ok(buf)
    }

    /// Decode a frame, validating signature, length fields, and checksum.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < METADATA {
            return Err(ProtocolError::ShortFrame(buf.len()).into());
        }

        let sig = [buf[0], buf[1], buf[2]];
        if sig != SIGNATURE && sig != RESPONSE_SIGNATURE {
            return Err(ProtocolError::BadSignature(sig).into());
        }

        let length = buf[index::LEN];
        let echo = buf[index::LEN_ECHO];
        if length != echo {
            return Err(ProtocolError::LengthMismatch { length, echo }.into());
        }

        let announced = (length as usize) + METADATA - LEN_BIAS;
        if announced != buf.len() {
            return Err(ProtocolError::FrameSizeMismatch {
                announced,
                actual: buf.len(),
            }
            .into());
        }

        let chk_index = buf.len() - 1;
        let expected = checksum(&buf[index::LEN..chk_index]);
        let got = buf[chk_index];
        if expected != got {
            return Err(ProtocolError::BadChecksum { expected, got }.into());
        }

        Ok(Self {
            equipment: buf[index::EQUIPMENT].into(),
            command: buf[index::COMMAND].into(),
            payload: buf[index::PAYLOAD..chk_index].to_vec(),
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""command": {}, "#, self.command)?;
        write!(f, r#""payload": {:02x?}"#, self.payload)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    #[rustfmt::skip]
    fn test_encode_set_kph() -> Result<()> {
        // Kph=10.0 write: write bitmap {0}, empty read bitmap, 0x03e8 LE
        let envelope = Envelope::new(
            Equipment::Treadmill,
            Command::WriteAndRead,
            vec![0x01, 0x01, 0x00, 0xe8, 0x03],
        );

        let expected = [
            // Signature
            0x02, 0x04, 0x02,
            // LEN | EQ | LEN | CMD
            0x09, 0x04, 0x09, 0x02,
            // Payload
            0x01, 0x01, 0x00, 0xe8, 0x03,
            // Checksum
            0x05,
        ];

        assert_eq!(envelope.encode()?, expected.to_vec());
        assert_eq!(Envelope::decode(expected.as_ref())?, envelope);

        Ok(())
    }

    #[test]
    #[rustfmt::skip]
    fn test_decode_response_signature() -> Result<()> {
        // Responses may open with 01 04 02 instead of 02 04 02
        let frame = [
            0x01, 0x04, 0x02,
            0x05, 0x04, 0x05, 0x90,
            0x02,
            0xa0,
        ];

        let envelope = Envelope::decode(frame.as_ref())?;

        assert_eq!(envelope.equipment(), Equipment::Treadmill);
        assert_eq!(envelope.command(), Command::Enable);
        assert_eq!(envelope.payload(), &[0x02]);

        // Re-encoding always emits the request signature
        assert_eq!(&envelope.encode()?[..3], &SIGNATURE);

        Ok(())
    }

    #[test]
    fn test_roundtrip_all_payload_sizes() -> Result<()> {
        for size in 0..=MAX_PAYLOAD {
            let payload: Vec<u8> = (0..size).map(|i| (i * 7) as u8).collect();
            let envelope = Envelope::new(Equipment::General, Command::WriteAndRead, payload);

            let buf = envelope.encode()?;
            assert_eq!(buf.len(), envelope.frame_len());
            assert_eq!(Envelope::decode(&buf)?, envelope);
        }

        Ok(())
    }

    #[test]
    fn test_payload_too_long() {
        let envelope = Envelope::new(
            Equipment::General,
            Command::WriteAndRead,
            vec![0u8; MAX_PAYLOAD + 1],
        );

        assert_eq!(
            envelope.encode(),
            Err(FramingError::EnvelopeTooLong(MAX_PAYLOAD + 1 + METADATA).into())
        );
    }

    #[test]
    fn test_bad_signature() {
        let mut buf = Envelope::new(Equipment::Treadmill, Command::Calibrate, vec![])
            .encode()
            .expect("encode");
        buf[0] = 0x03;

        assert_eq!(
            Envelope::decode(&buf),
            Err(ProtocolError::BadSignature([0x03, 0x04, 0x02]).into())
        );
    }

    #[test]
    fn test_length_mismatch() {
        let mut buf = Envelope::new(Equipment::Treadmill, Command::Enable, vec![0x01, 0x02])
            .encode()
            .expect("encode");
        buf[index::LEN_ECHO] = buf[index::LEN_ECHO].wrapping_add(1);

        assert!(matches!(
            Envelope::decode(&buf),
            Err(Error::Protocol(ProtocolError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_bad_checksum() {
        let mut buf = Envelope::new(
            Equipment::Treadmill,
            Command::WriteAndRead,
            vec![0x01, 0x01, 0x00, 0xe8, 0x03],
        )
        .encode()
        .expect("encode");

        let last = buf.len() - 1;
        buf[last] ^= 0x01;

        assert!(matches!(
            Envelope::decode(&buf),
            Err(Error::Protocol(ProtocolError::BadChecksum { .. }))
        ));
    }

    #[test]
    fn test_single_bit_flips_never_decode_silently() {
        let envelope = Envelope::new(
            Equipment::Treadmill,
            Command::WriteAndRead,
            vec![0x01, 0x01, 0x00, 0xe8, 0x03],
        );
        let buf = envelope.encode().expect("encode");

        // Any flip outside the signature must surface an error, never a
        // silently different envelope.
        for byte in 3..buf.len() {
            for bit in 0..8 {
                let mut corrupt = buf.clone();
                corrupt[byte] ^= 1 << bit;

                assert!(
                    Envelope::decode(&corrupt).is_err(),
                    "flip of byte {byte} bit {bit} went unnoticed"
                );
            }
        }
    }

    #[test]
    fn test_short_frame() {
        assert_eq!(
            Envelope::decode(&[0x02, 0x04, 0x02]),
            Err(ProtocolError::ShortFrame(3).into())
        );
    }
}
