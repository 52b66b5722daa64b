use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{catalog, Error, Result, Value};

/// Write And Read - Reply (0x02)
///
/// The inner payload is the concatenated read values, one per requested ID in
/// ascending order, each sized by its catalog converter. The equipment
/// occasionally appends padding, which is retained but not interpreted.
///
/// An ID missing from the catalog is fatal for the whole reply: without the
/// converter there is no width to skip ahead by.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteReadReply {
    values: BTreeMap<u8, Value>,
    trailing: Vec<u8>,
}

impl WriteReadReply {
    /// Decode the read values from a reply payload.
    ///
    /// `reads` must be the ID set of the originating request; the reply
    /// carries no IDs of its own.
    pub fn parse(payload: &[u8], reads: &BTreeSet<u8>) -> Result<Self> {
        let mut values = BTreeMap::new();
        let mut rest = payload;

        for &id in reads {
            let characteristic = catalog::by_id(id).ok_or(Error::UnknownCharacteristic(id))?;
            let (value, used) = characteristic.converter().decode(rest)?;

            values.insert(id, value);
            rest = &rest[used..];
        }

        Ok(Self {
            values,
            trailing: rest.to_vec(),
        })
    }

    /// Gets the decoded values, keyed by characteristic ID.
    pub fn values(&self) -> &BTreeMap<u8, Value> {
        &self.values
    }

    /// Consumes the reply, returning the decoded values.
    pub fn into_values(self) -> BTreeMap<u8, Value> {
        self.values
    }

    /// Gets any uninterpreted bytes past the last read value.
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }
}

impl fmt::Display for WriteReadReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""values": {{"#)?;
        for (i, (id, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, r#""{id}": {value}"#)?;
        }
        write!(f, "}}, ")?;
        write!(f, r#""trailing": {:02x?}"#, self.trailing)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PulseSource, PulseValue};

    #[test]
    #[rustfmt::skip]
    fn test_parse_monitor_poll() -> Result<()> {
        // CurrentDistance(4), Pulse(10), CurrentKph(16), CurrentIncline(17),
        // CurrentTime(20) as captured from a treadmill
        let payload = [
            // CurrentDistance: 123456
            0x40, 0xe2, 0x01, 0x00,
            // Pulse: 120 bpm, 80 avg, 10 samples, BLE HRM
            0x78, 0x50, 0x0a, 0x04,
            // CurrentKph: 3.0
            0x2c, 0x01,
            // CurrentIncline: 6.0
            0x58, 0x02,
            // CurrentTime: 120
            0x78, 0x00, 0x00, 0x00,
        ];
        let reads: BTreeSet<u8> = [4u8, 10, 16, 17, 20].iter().copied().collect();

        let reply = WriteReadReply::parse(payload.as_ref(), &reads)?;

        let expected = BTreeMap::from([
            (4u8, Value::Uint32(123_456)),
            (10u8, Value::Pulse(PulseValue::new(120, 80, 10, PulseSource::BleHrm))),
            (16u8, Value::Double(3.0)),
            (17u8, Value::Double(6.0)),
            (20u8, Value::Uint32(120)),
        ]);

        assert_eq!(reply.values(), &expected);
        assert!(reply.trailing().is_empty());

        Ok(())
    }

    #[test]
    fn test_parse_retains_padding() -> Result<()> {
        let reads: BTreeSet<u8> = [9u8].iter().copied().collect();
        let reply = WriteReadReply::parse(&[0x07, 0xde, 0xad], &reads)?;

        assert_eq!(reply.values().get(&9), Some(&Value::Uint8(7)));
        assert_eq!(reply.trailing(), &[0xde, 0xad]);

        Ok(())
    }

    #[test]
    fn test_parse_unknown_id_is_fatal() {
        let reads: BTreeSet<u8> = [4u8, 200].iter().copied().collect();

        assert_eq!(
            WriteReadReply::parse(&[0u8; 16], &reads),
            Err(Error::UnknownCharacteristic(200))
        );
    }

    #[test]
    fn test_parse_short_payload() {
        let reads: BTreeSet<u8> = [4u8, 20].iter().copied().collect();

        // Enough for the first read, nothing left for the second
        assert!(matches!(
            WriteReadReply::parse(&[0x01, 0x00, 0x00, 0x00, 0x99], &reads),
            Err(Error::MalformedValue { .. })
        ));
    }
}
