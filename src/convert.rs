use std::fmt;

use crate::{Error, PulseValue, Result, Value};

/// Fixed-point scale for fractional characteristic values.
pub const DOUBLE_SCALE: f64 = 100.0;

/// Numerator of the firmware scale for calorie totals.
///
/// The stored integer represents `v * (SCALED32_NUMERATOR / SCALED32_DENOMINATOR)`.
/// The odd ratio is inherited from the device firmware and must not be
/// simplified: rescaling through a decimal approximation is not bit-identical.
pub const SCALED32_NUMERATOR: f64 = 1024.0;
/// Denominator of the firmware scale for calorie totals.
pub const SCALED32_DENOMINATOR: f64 = 100_000_000.0;

/// Typed encoder/decoder attached to a catalog entry.
///
/// Each variant maps one [Value] shape onto a fixed-width little-endian wire
/// form. Converters are pure: encoding and decoding never touch session state.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Converter {
    Uint8,
    Uint16,
    Uint32,
    /// Fractional value stored as `round(v * 100)` in an unsigned 16-bit field.
    Double,
    /// Calorie total stored as `round(v * 1024 / 100000000)` in an unsigned 32-bit field.
    Scaled32,
    /// Single byte, strictly `0x00` or `0x01`.
    Bool,
    /// Four fixed bytes: current BPM, average BPM, sample count, source.
    Pulse,
}

impl Converter {
    /// Gets the wire width in bytes.
    pub const fn width(&self) -> usize {
        match self {
            Self::Uint8 | Self::Bool => 1,
            Self::Uint16 | Self::Double => 2,
            Self::Uint32 | Self::Scaled32 | Self::Pulse => 4,
        }
    }

    /// Gets the converter name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uint8 => "Uint8",
            Self::Uint16 => "Uint16",
            Self::Uint32 => "Uint32",
            Self::Double => "Double",
            Self::Scaled32 => "Scaled32",
            Self::Bool => "Bool",
            Self::Pulse => "Pulse",
        }
    }

    /// Encode a [Value] into its little-endian wire bytes.
    ///
    /// Returns [Error::ValueOutOfRange] when the value does not fit the wire
    /// field, and a generic failure when the variant does not match the
    /// converter.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match (self, value) {
            (Self::Uint8, Value::Uint8(v)) => Ok(vec![*v]),
            (Self::Uint16, Value::Uint16(v)) => Ok(v.to_le_bytes().to_vec()),
            (Self::Uint32, Value::Uint32(v)) => Ok(v.to_le_bytes().to_vec()),
            (Self::Double, Value::Double(v)) => {
                let max = u16::MAX as f64 / DOUBLE_SCALE;
                if !(0.0..=max).contains(v) {
                    return Err(Error::ValueOutOfRange {
                        name: self.name(),
                        value: *v,
                    });
                }
                let scaled = (v * DOUBLE_SCALE).round() as u16;
                Ok(scaled.to_le_bytes().to_vec())
            }
            (Self::Scaled32, Value::Double(v)) => {
                let scaled = (v * SCALED32_NUMERATOR / SCALED32_DENOMINATOR).round();
                if *v < 0.0 || scaled > u32::MAX as f64 {
                    return Err(Error::ValueOutOfRange {
                        name: self.name(),
                        value: *v,
                    });
                }
                Ok((scaled as u32).to_le_bytes().to_vec())
            }
            (Self::Bool, Value::Bool(v)) => Ok(vec![*v as u8]),
            (Self::Pulse, Value::Pulse(v)) => Ok(<[u8; 4]>::from(v).to_vec()),
            (_, value) => Err(Error::failure(format!(
                "cannot encode {value} with the {} converter",
                self.name()
            ))),
        }
    }

    /// Decode a [Value] from the front of `buf`, returning the bytes consumed.
    ///
    /// Returns [Error::MalformedValue] when `buf` is shorter than the wire
    /// width or carries bytes outside the converter's domain.
    pub fn decode(&self, buf: &[u8]) -> Result<(Value, usize)> {
        let width = self.width();
        if buf.len() < width {
            return Err(Error::MalformedValue {
                name: self.name(),
                raw: buf.to_vec(),
            });
        }

        let value = match self {
            Self::Uint8 => Value::Uint8(buf[0]),
            Self::Uint16 => Value::Uint16(u16::from_le_bytes([buf[0], buf[1]])),
            Self::Uint32 => {
                Value::Uint32(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
            }
            Self::Double => {
                let raw = u16::from_le_bytes([buf[0], buf[1]]);
                Value::Double(raw as f64 / DOUBLE_SCALE)
            }
            Self::Scaled32 => {
                let raw = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
                Value::Double(raw as f64 * SCALED32_DENOMINATOR / SCALED32_NUMERATOR)
            }
            Self::Bool => match buf[0] {
                0x00 => Value::Bool(false),
                0x01 => Value::Bool(true),
                _ => {
                    return Err(Error::MalformedValue {
                        name: self.name(),
                        raw: buf[..width].to_vec(),
                    })
                }
            },
            Self::Pulse => {
                Value::Pulse(PulseValue::from([buf[0], buf[1], buf[2], buf[3]]))
            }
        };

        Ok((value, width))
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PulseSource;

    #[test]
    fn test_uint_roundtrip() -> Result<()> {
        assert_eq!(Converter::Uint8.encode(&Value::Uint8(0x7f))?, vec![0x7f]);
        assert_eq!(
            Converter::Uint16.encode(&Value::Uint16(0x1234))?,
            vec![0x34, 0x12]
        );
        assert_eq!(
            Converter::Uint32.encode(&Value::Uint32(123_456))?,
            vec![0x40, 0xe2, 0x01, 0x00]
        );

        let (value, used) = Converter::Uint32.decode(&[0x40, 0xe2, 0x01, 0x00])?;
        assert_eq!(value, Value::Uint32(123_456));
        assert_eq!(used, 4);

        Ok(())
    }

    #[test]
    fn test_double_roundtrip_exhaustive() -> Result<()> {
        for raw in 0..=u16::MAX {
            let (value, used) = Converter::Double.decode(&raw.to_le_bytes())?;
            assert_eq!(used, 2);

            let bytes = Converter::Double.encode(&value)?;
            assert_eq!(bytes, raw.to_le_bytes().to_vec());

            let expected = raw as f64 / DOUBLE_SCALE;
            assert!((value.into_double()? - expected).abs() < 1e-9);
        }

        Ok(())
    }

    #[test]
    fn test_double_boundaries() -> Result<()> {
        assert_eq!(
            Converter::Double.encode(&Value::Double(0.0))?,
            vec![0x00, 0x00]
        );
        assert_eq!(
            Converter::Double.encode(&Value::Double(655.35))?,
            vec![0xff, 0xff]
        );
        assert_eq!(
            Converter::Double.encode(&Value::Double(10.0))?,
            vec![0xe8, 0x03]
        );

        // Rounding tie goes away from zero
        assert_eq!(
            Converter::Double.encode(&Value::Double(0.005))?,
            vec![0x01, 0x00]
        );

        assert_eq!(
            Converter::Double.encode(&Value::Double(655.36)),
            Err(Error::ValueOutOfRange {
                name: "Double",
                value: 655.36
            })
        );
        assert_eq!(
            Converter::Double.encode(&Value::Double(-0.01)),
            Err(Error::ValueOutOfRange {
                name: "Double",
                value: -0.01
            })
        );

        Ok(())
    }

    #[test]
    fn test_scaled32_bit_exact() -> Result<()> {
        // The firmware ratio applied verbatim: v * 1024 / 100000000
        let v = 100_000_000.0;
        assert_eq!(
            Converter::Scaled32.encode(&Value::Double(v))?,
            1024u32.to_le_bytes().to_vec()
        );

        let (value, used) = Converter::Scaled32.decode(&1024u32.to_le_bytes())?;
        assert_eq!(used, 4);
        assert_eq!(value, Value::Double(v));

        Ok(())
    }

    #[test]
    fn test_scaled32_roundtrip_sampled() -> Result<()> {
        for raw in (0..=u32::MAX).step_by(65_537) {
            let (value, _) = Converter::Scaled32.decode(&raw.to_le_bytes())?;
            let bytes = Converter::Scaled32.encode(&value)?;
            assert_eq!(bytes, raw.to_le_bytes().to_vec());
        }

        assert!(Converter::Scaled32
            .encode(&Value::Double(-1.0))
            .is_err());

        Ok(())
    }

    #[test]
    fn test_bool_strict() -> Result<()> {
        assert_eq!(Converter::Bool.encode(&Value::Bool(false))?, vec![0x00]);
        assert_eq!(Converter::Bool.encode(&Value::Bool(true))?, vec![0x01]);

        for raw in 0..=u8::MAX {
            let res = Converter::Bool.decode(&[raw]);
            match raw {
                0x00 => assert_eq!(res?, (Value::Bool(false), 1)),
                0x01 => assert_eq!(res?, (Value::Bool(true), 1)),
                _ => assert_eq!(
                    res,
                    Err(Error::MalformedValue {
                        name: "Bool",
                        raw: vec![raw]
                    })
                ),
            }
        }

        Ok(())
    }

    #[test]
    fn test_pulse_decode() -> Result<()> {
        let (value, used) = Converter::Pulse.decode(&[120, 80, 10, 4])?;
        assert_eq!(used, 4);
        assert_eq!(
            value,
            Value::Pulse(PulseValue::new(120, 80, 10, PulseSource::BleHrm))
        );

        // Unknown sources decode without erroring
        let (value, _) = Converter::Pulse.decode(&[60, 60, 1, 9])?;
        assert_eq!(
            value.into_pulse()?.source,
            PulseSource::Unknown(9)
        );

        Ok(())
    }

    #[test]
    fn test_short_input() {
        assert_eq!(
            Converter::Uint32.decode(&[0x01, 0x02]),
            Err(Error::MalformedValue {
                name: "Uint32",
                raw: vec![0x01, 0x02]
            })
        );
    }

    #[test]
    fn test_variant_mismatch() {
        assert!(Converter::Uint8.encode(&Value::Double(1.0)).is_err());
        assert!(Converter::Pulse.encode(&Value::Uint32(1)).is_err());
    }
}
