// float24.rs — PICA 24-bit floating point (1 sign, 7 exponent, 16 mantissa bits)

const MANTISSA_BITS: u32 = 16;
const EXPONENT_BITS: u32 = 7;
const WIDTH: u32 = MANTISSA_BITS + EXPONENT_BITS + 1;

/// Difference between the f32 exponent bias (127) and the float24 bias (63).
const BIAS_ADJUST: u32 = 128 - (1 << (EXPONENT_BITS - 1));

/// A float24 value, held widened to f32.
///
/// The shader unit stores uniforms and attributes in this format; the host
/// renderer only ever needs the widened value.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Float24(f32);

impl Float24 {
    pub const ONE: Self = Self(1.0);

    /// Decode the raw 24-bit register encoding (upper 8 bits are ignored).
    pub fn from_raw(raw: u32) -> Self {
        let raw = raw & ((1 << WIDTH) - 1);
        let exponent = (raw >> MANTISSA_BITS) & ((1 << EXPONENT_BITS) - 1);
        let mantissa = raw & ((1 << MANTISSA_BITS) - 1);
        let sign = (raw >> (EXPONENT_BITS + MANTISSA_BITS)) << 31;

        let bits = if raw & ((1 << (WIDTH - 1)) - 1) == 0 {
            sign
        } else if exponent == (1 << EXPONENT_BITS) - 1 {
            sign | 0x7F80_0000 | (mantissa << (23 - MANTISSA_BITS))
        } else {
            sign | ((exponent + BIAS_ADJUST) << 23) | (mantissa << (23 - MANTISSA_BITS))
        };

        Self(f32::from_bits(bits))
    }

    #[inline]
    pub const fn from_f32(value: f32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn to_f32(self) -> f32 {
        self.0
    }
}

impl From<f32> for Float24 {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // from_raw
    // ============================================================

    #[test]
    fn test_from_raw_one() {
        assert_eq!(Float24::from_raw(0x3F_0000).to_f32(), 1.0);
    }

    #[test]
    fn test_from_raw_fractions() {
        assert_eq!(Float24::from_raw(0x3E_0000).to_f32(), 0.5);
        assert_eq!(Float24::from_raw(0x3F_8000).to_f32(), 1.5);
    }

    #[test]
    fn test_from_raw_negative() {
        assert_eq!(Float24::from_raw(0xC0_0000).to_f32(), -2.0);
    }

    #[test]
    fn test_from_raw_zero_keeps_sign() {
        let pos = Float24::from_raw(0x00_0000).to_f32();
        let neg = Float24::from_raw(0x80_0000).to_f32();
        assert_eq!(pos, 0.0);
        assert!(pos.is_sign_positive());
        assert_eq!(neg, 0.0);
        assert!(neg.is_sign_negative());
    }

    #[test]
    fn test_from_raw_infinity_and_nan() {
        assert_eq!(Float24::from_raw(0x7F_0000).to_f32(), f32::INFINITY);
        assert_eq!(Float24::from_raw(0xFF_0000).to_f32(), f32::NEG_INFINITY);
        assert!(Float24::from_raw(0x7F_0001).to_f32().is_nan());
    }

    #[test]
    fn test_from_raw_ignores_upper_byte() {
        assert_eq!(Float24::from_raw(0xAB3F_0000), Float24::ONE);
    }

    #[test]
    fn test_from_f32_round_trips_value() {
        assert_eq!(Float24::from_f32(-3.25).to_f32(), -3.25);
        assert_eq!(Float24::from(0.75).to_f32(), 0.75);
    }
}
