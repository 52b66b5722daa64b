use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::Converter;

/// A protocol-level named, typed value exposed by the equipment.
///
/// Distinct from a GATT characteristic: the whole catalog rides on the single
/// RX/TX characteristic pair, addressed by the one-byte `id`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Characteristic {
    id: u8,
    name: &'static str,
    writable: bool,
    converter: Converter,
}

impl Characteristic {
    const fn new(id: u8, name: &'static str, writable: bool, converter: Converter) -> Self {
        Self {
            id,
            name,
            writable,
            converter,
        }
    }

    /// Gets the protocol ID.
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Gets the semantic name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Gets whether the equipment accepts writes to this characteristic.
    pub const fn writable(&self) -> bool {
        self.writable
    }

    /// Gets the converter carrying this characteristic's values.
    pub const fn converter(&self) -> Converter {
        self.converter
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""id": {}, "#, self.id)?;
        write!(f, r#""name": "{}", "#, self.name)?;
        write!(f, r#""writable": {}, "#, self.writable)?;
        write!(f, r#""converter": "{}""#, self.converter)?;
        write!(f, "}}")
    }
}

/// The static characteristic table, ascending by ID.
///
/// Authoritative after process start; runtime mutation is not possible.
static CHARACTERISTICS: [Characteristic; 21] = [
    Characteristic::new(0, "Kph", true, Converter::Double),
    Characteristic::new(1, "Incline", true, Converter::Double),
    Characteristic::new(4, "CurrentDistance", false, Converter::Uint32),
    Characteristic::new(9, "Volume", true, Converter::Uint8),
    Characteristic::new(10, "Pulse", false, Converter::Pulse),
    Characteristic::new(11, "UpTime", false, Converter::Uint32),
    Characteristic::new(12, "Mode", true, Converter::Uint8),
    Characteristic::new(13, "Calories", false, Converter::Scaled32),
    Characteristic::new(16, "CurrentKph", false, Converter::Double),
    Characteristic::new(17, "CurrentIncline", false, Converter::Double),
    Characteristic::new(20, "CurrentTime", false, Converter::Uint32),
    Characteristic::new(21, "CurrentCalories", false, Converter::Scaled32),
    Characteristic::new(27, "MaxIncline", false, Converter::Double),
    Characteristic::new(28, "MinIncline", false, Converter::Double),
    Characteristic::new(30, "MaxKph", false, Converter::Double),
    Characteristic::new(31, "MinKph", false, Converter::Double),
    Characteristic::new(36, "Metric", true, Converter::Bool),
    Characteristic::new(49, "MaxPulse", false, Converter::Uint8),
    Characteristic::new(52, "AverageIncline", false, Converter::Double),
    Characteristic::new(70, "TotalTime", false, Converter::Uint32),
    Characteristic::new(103, "PausedTime", false, Converter::Uint32),
];

fn id_index() -> &'static [Option<u8>; 256] {
    static INDEX: OnceLock<[Option<u8>; 256]> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index = [None; 256];
        for (i, characteristic) in CHARACTERISTICS.iter().enumerate() {
            index[characteristic.id as usize] = Some(i as u8);
        }
        index
    })
}

fn name_index() -> &'static HashMap<&'static str, &'static Characteristic> {
    static INDEX: OnceLock<HashMap<&'static str, &'static Characteristic>> = OnceLock::new();
    INDEX.get_or_init(|| {
        CHARACTERISTICS
            .iter()
            .map(|characteristic| (characteristic.name, characteristic))
            .collect()
    })
}

/// Looks up a characteristic by protocol ID.
pub fn by_id(id: u8) -> Option<&'static Characteristic> {
    id_index()[id as usize].map(|i| &CHARACTERISTICS[i as usize])
}

/// Looks up a characteristic by semantic name.
pub fn by_name(name: &str) -> Option<&'static Characteristic> {
    name_index().get(name).copied()
}

/// Gets whether `id` names a writable characteristic.
///
/// Unknown IDs are not writable.
pub fn writable_by_id(id: u8) -> bool {
    by_id(id).map(|c| c.writable()).unwrap_or(false)
}

/// Iterates the catalog in ascending ID order.
pub fn iter_sorted_by_id() -> impl Iterator<Item = &'static Characteristic> {
    CHARACTERISTICS.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_unique_and_sorted() {
        let mut last = None;
        for characteristic in iter_sorted_by_id() {
            if let Some(prev) = last {
                assert!(characteristic.id() > prev, "table out of order at {prev}");
            }
            last = Some(characteristic.id());
        }
    }

    #[test]
    fn test_by_id() {
        let kph = by_id(0).expect("Kph missing");
        assert_eq!(kph.name(), "Kph");
        assert!(kph.writable());
        assert_eq!(kph.converter(), Converter::Double);

        let pulse = by_id(10).expect("Pulse missing");
        assert_eq!(pulse.converter(), Converter::Pulse);
        assert!(!pulse.writable());

        assert!(by_id(2).is_none());
        assert!(by_id(0xff).is_none());
    }

    #[test]
    fn test_by_name() {
        let metric = by_name("Metric").expect("Metric missing");
        assert_eq!(metric.id(), 36);
        assert_eq!(metric.converter(), Converter::Bool);

        assert_eq!(by_name("Kph").map(Characteristic::id), Some(0));
        assert!(by_name("NoSuchCharacteristic").is_none());
    }

    #[test]
    fn test_writable_by_id() {
        for id in [0u8, 1, 9, 12, 36] {
            assert!(writable_by_id(id), "{id} should be writable");
        }
        for id in [4u8, 10, 16, 103, 0xfe] {
            assert!(!writable_by_id(id), "{id} should not be writable");
        }
    }

    #[test]
    fn test_converter_widths_match_protocol() {
        let widths: [(u8, usize); 8] = [
            (0, 2),
            (4, 4),
            (9, 1),
            (10, 4),
            (13, 4),
            (16, 2),
            (36, 1),
            (70, 4),
        ];
        for (id, width) in widths {
            let characteristic = by_id(id).expect("missing characteristic");
            assert_eq!(characteristic.converter().width(), width, "width of {id}");
        }
    }
}
