use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inner_enum;

/// Workout mode reported and accepted through the `Mode` characteristic.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Mode {
    #[default]
    Unknown = 0,
    Idle = 1,
    Active = 2,
    Pause = 3,
    Summary = 4,
    Settings = 7,
    MissingSafetyKey = 8,
}

impl From<u8> for Mode {
    fn from(b: u8) -> Self {
        match b {
            1 => Self::Idle,
            2 => Self::Active,
            3 => Self::Pause,
            4 => Self::Summary,
            7 => Self::Settings,
            8 => Self::MissingSafetyKey,
            _ => Self::Unknown,
        }
    }
}

impl From<Mode> for u8 {
    fn from(m: Mode) -> Self {
        m as u8
    }
}

impl From<Mode> for &'static str {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Unknown => "Unknown",
            Mode::Idle => "Idle",
            Mode::Active => "Active",
            Mode::Pause => "Pause",
            Mode::Summary => "Summary",
            Mode::Settings => "Settings",
            Mode::MissingSafetyKey => "MissingSafetyKey",
        }
    }
}

impl From<&Mode> for &'static str {
    fn from(m: &Mode) -> Self {
        (*m).into()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(self))
    }
}

/// Origin of a pulse reading, carried in the fourth byte of the composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum PulseSource {
    #[default]
    None,
    HandGrip,
    Unknown2,
    Unknown3,
    BleHrm,
    /// Source byte not listed in the protocol document.
    Unknown(u8),
}

impl From<u8> for PulseSource {
    fn from(b: u8) -> Self {
        match b {
            0 => Self::None,
            1 => Self::HandGrip,
            2 => Self::Unknown2,
            3 => Self::Unknown3,
            4 => Self::BleHrm,
            raw => Self::Unknown(raw),
        }
    }
}

impl From<PulseSource> for u8 {
    fn from(s: PulseSource) -> Self {
        match s {
            PulseSource::None => 0,
            PulseSource::HandGrip => 1,
            PulseSource::Unknown2 => 2,
            PulseSource::Unknown3 => 3,
            PulseSource::BleHrm => 4,
            PulseSource::Unknown(raw) => raw,
        }
    }
}

impl From<&PulseSource> for u8 {
    fn from(s: &PulseSource) -> Self {
        (*s).into()
    }
}

impl fmt::Display for PulseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::HandGrip => write!(f, "HandGrip"),
            Self::Unknown2 => write!(f, "Unknown2"),
            Self::Unknown3 => write!(f, "Unknown3"),
            Self::BleHrm => write!(f, "BleHrm"),
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

/// Composite pulse reading: current BPM, session average, sample count, source.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PulseValue {
    pub current_bpm: u8,
    pub average_bpm: u8,
    pub sample_count: u8,
    pub source: PulseSource,
}

impl PulseValue {
    /// Creates a new [PulseValue].
    pub fn new(current_bpm: u8, average_bpm: u8, sample_count: u8, source: PulseSource) -> Self {
        Self {
            current_bpm,
            average_bpm,
            sample_count,
            source,
        }
    }
}

impl From<[u8; 4]> for PulseValue {
    fn from(b: [u8; 4]) -> Self {
        Self {
            current_bpm: b[0],
            average_bpm: b[1],
            sample_count: b[2],
            source: b[3].into(),
        }
    }
}

impl From<PulseValue> for [u8; 4] {
    fn from(p: PulseValue) -> Self {
        [p.current_bpm, p.average_bpm, p.sample_count, p.source.into()]
    }
}

impl From<&PulseValue> for [u8; 4] {
    fn from(p: &PulseValue) -> Self {
        (*p).into()
    }
}

impl fmt::Display for PulseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        write!(f, r#""current_bpm": {}, "#, self.current_bpm)?;
        write!(f, r#""average_bpm": {}, "#, self.average_bpm)?;
        write!(f, r#""sample_count": {}, "#, self.sample_count)?;
        write!(f, r#""source": "{}""#, self.source)?;
        write!(f, "}}")
    }
}

/// Tagged union over the encoded characteristic value types.
///
/// The only type that appears in the session's typed get/set API. The
/// converter attached to a catalog entry decides how each variant crosses the
/// wire.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum Value {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Double(f64),
    Bool(bool),
    Pulse(PulseValue),
}

inner_enum!(Value, Uint8, u8);
inner_enum!(Value, Uint16, u16);
inner_enum!(Value, Uint32, u32);
inner_enum!(Value, Double, f64);
inner_enum!(Value, Bool, bool);
inner_enum!(Value, Pulse, PulseValue);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Pulse(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_u8() {
        assert_eq!(Mode::from(1), Mode::Idle);
        assert_eq!(Mode::from(2), Mode::Active);
        assert_eq!(Mode::from(3), Mode::Pause);
        assert_eq!(Mode::from(4), Mode::Summary);
        assert_eq!(Mode::from(7), Mode::Settings);
        assert_eq!(Mode::from(8), Mode::MissingSafetyKey);

        // Undocumented values collapse to Unknown
        for raw in [0u8, 5, 6, 9, 42, 0xff] {
            assert_eq!(Mode::from(raw), Mode::Unknown);
        }
    }

    #[test]
    fn test_pulse_source_roundtrip() {
        for raw in 0..=u8::MAX {
            let source = PulseSource::from(raw);
            assert_eq!(u8::from(source), raw);
        }

        assert_eq!(PulseSource::from(4), PulseSource::BleHrm);
        assert_eq!(PulseSource::from(9), PulseSource::Unknown(9));
    }

    #[test]
    fn test_pulse_value_roundtrip() {
        let raw = [120u8, 80, 10, 4];
        let pulse = PulseValue::from(raw);

        assert_eq!(pulse.current_bpm, 120);
        assert_eq!(pulse.average_bpm, 80);
        assert_eq!(pulse.sample_count, 10);
        assert_eq!(pulse.source, PulseSource::BleHrm);
        assert_eq!(<[u8; 4]>::from(pulse), raw);
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::Double(8.5);

        assert!(value.is_double());
        assert_eq!(value.as_double(), Ok(&8.5));
        assert!(value.as_uint32().is_err());
        assert_eq!(value.into_double(), Ok(8.5));
    }
}
