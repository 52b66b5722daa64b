use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{bitmap::encode_bitmap, catalog, Command, CommandOps, Equipment, Error, Result, Value};

/// Write And Read - Command (0x02)
///
/// The general-purpose operation: write values to writable characteristics
/// and read others back in a single exchange. Writes and reads may overlap
/// freely.
///
/// Payload layout, IDs strictly ascending as the protocol requires:
///
/// | Field | write bitmap | read bitmap | write values        |
/// |:------|:------------:|:-----------:|:-------------------:|
/// | Bytes | `LL b0..`    | `LL b0..`   | per-converter width |
#[derive(Clone, Debug, PartialEq)]
pub struct WriteReadCommand {
    equipment: Equipment,
    writes: BTreeMap<u8, Value>,
    reads: BTreeSet<u8>,
}

impl WriteReadCommand {
    /// Creates a new [WriteReadCommand].
    ///
    /// Every write ID must name a writable catalog entry, and every ID on
    /// either side must exist in the catalog.
    pub fn new(
        equipment: Equipment,
        writes: BTreeMap<u8, Value>,
        reads: BTreeSet<u8>,
    ) -> Result<Self> {
        for &id in writes.keys() {
            let characteristic = catalog::by_id(id).ok_or(Error::UnknownCharacteristic(id))?;
            if !characteristic.writable() {
                return Err(Error::NotWritable(id));
            }
        }
        for &id in &reads {
            if catalog::by_id(id).is_none() {
                return Err(Error::UnknownCharacteristic(id));
            }
        }

        Ok(Self {
            equipment,
            writes,
            reads,
        })
    }

    /// Gets the values to write, keyed by characteristic ID.
    pub fn writes(&self) -> &BTreeMap<u8, Value> {
        &self.writes
    }

    /// Gets the characteristic IDs to read back.
    pub fn reads(&self) -> &BTreeSet<u8> {
        &self.reads
    }
}

impl CommandOps for WriteReadCommand {
    fn equipment(&self) -> Equipment {
        self.equipment
    }

    fn command(&self) -> Command {
        Command::WriteAndRead
    }

    fn payload(&self) -> Result<Vec<u8>> {
        let write_ids: BTreeSet<u8> = self.writes.keys().copied().collect();

        let mut payload = encode_bitmap(&write_ids);
        payload.extend_from_slice(&encode_bitmap(&self.reads));

        // BTreeMap iteration carries the ascending-ID ordering invariant
        for (&id, value) in &self.writes {
            let characteristic = catalog::by_id(id).ok_or(Error::UnknownCharacteristic(id))?;
            payload.extend_from_slice(&characteristic.converter().encode(value)?);
        }

        Ok(payload)
    }
}

impl fmt::Display for WriteReadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""equipment": {}, "#, self.equipment)?;
        write!(f, r#""writes": {{"#)?;
        for (i, (id, value)) in self.writes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, r#""{id}": {value}"#)?;
        }
        write!(f, "}}, ")?;
        write!(f, r#""reads": {:?}"#, self.reads)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk;

    #[test]
    #[rustfmt::skip]
    fn test_set_kph_on_the_wire() -> Result<()> {
        // Kph=10.0, nothing read back
        let writes = BTreeMap::from([(0u8, Value::Double(10.0))]);
        let msg = WriteReadCommand::new(Equipment::Treadmill, writes, BTreeSet::new())?;

        assert_eq!(msg.payload()?, vec![0x01, 0x01, 0x00, 0xe8, 0x03]);

        let chunks = chunk::chunk(&msg.encode()?)?;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], vec![0xfe, 0x02, 0x0d, 0x02]);
        assert_eq!(
            chunks[1],
            vec![
                0xff, 0x0d,
                0x02, 0x04, 0x02,
                0x09, 0x04, 0x09, 0x02,
                0x01, 0x01, 0x00, 0xe8, 0x03,
                0x05,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_write_values_ascend_by_id() -> Result<()> {
        let writes = BTreeMap::from([
            (12u8, Value::Uint8(2)),
            (0u8, Value::Double(8.0)),
            (9u8, Value::Uint8(5)),
        ]);
        let msg = WriteReadCommand::new(Equipment::Treadmill, writes, BTreeSet::new())?;
        let payload = msg.payload()?;

        // Write bitmap for {0, 9, 12}: two body bytes
        assert_eq!(&payload[..3], &[0x02, 0x01, 0x12]);
        // Empty read bitmap
        assert_eq!(payload[3], 0x00);
        // Kph (id 0) first, then Volume (9), then Mode (12)
        assert_eq!(&payload[4..], &[0x20, 0x03, 0x05, 0x02]);

        Ok(())
    }

    #[test]
    fn test_read_only_request() -> Result<()> {
        let reads: BTreeSet<u8> = [4u8, 10, 16, 17, 20].iter().copied().collect();
        let msg = WriteReadCommand::new(Equipment::Treadmill, BTreeMap::new(), reads)?;
        let payload = msg.payload()?;

        // Empty write bitmap, then a three-byte read bitmap covering ID 20
        assert_eq!(payload[0], 0x00);
        assert_eq!(&payload[1..], &[0x03, 0x10, 0x04, 0x13]);

        Ok(())
    }

    #[test]
    fn test_rejects_read_only_write() {
        let writes = BTreeMap::from([(16u8, Value::Double(3.0))]);

        assert_eq!(
            WriteReadCommand::new(Equipment::Treadmill, writes, BTreeSet::new()),
            Err(Error::NotWritable(16))
        );
    }

    #[test]
    fn test_rejects_unknown_ids() {
        let writes = BTreeMap::from([(2u8, Value::Uint8(0))]);
        assert_eq!(
            WriteReadCommand::new(Equipment::Treadmill, writes, BTreeSet::new()),
            Err(Error::UnknownCharacteristic(2))
        );

        let reads: BTreeSet<u8> = [200u8].iter().copied().collect();
        assert_eq!(
            WriteReadCommand::new(Equipment::Treadmill, BTreeMap::new(), reads),
            Err(Error::UnknownCharacteristic(200))
        );
    }

    #[test]
    fn test_overlapping_write_and_read_allowed() -> Result<()> {
        let writes = BTreeMap::from([(0u8, Value::Double(6.5))]);
        let reads: BTreeSet<u8> = [0u8].iter().copied().collect();

        let msg = WriteReadCommand::new(Equipment::Treadmill, writes, reads)?;

        assert_eq!(msg.payload()?, vec![0x01, 0x01, 0x01, 0x01, 0x8a, 0x02]);

        Ok(())
    }
}
