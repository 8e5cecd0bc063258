// Fixed-point conversions used by controller payloads
//
// 8.8 values carry the integer part in the upper byte; 16.16 values carry it
// in the upper half-word. Signed variants are two's complement.

const SCALE_8_8: f32 = 256.0;
const SCALE_16_16: f32 = 65536.0;

/// Unsigned 8.8 fixed point to float
pub fn fixed16_to_f32(fx: u16) -> f32 {
    (fx >> 8) as f32 + (fx & 0x00FF) as f32 / SCALE_8_8
}

/// Unsigned 16.16 fixed point to float
pub fn fixed32_to_f32(fx: u32) -> f32 {
    (fx >> 16) as f32 + (fx & 0x0000_FFFF) as f32 / SCALE_16_16
}

/// Signed 8.8 fixed point to float
pub fn sfixed16_to_f32(fx: i16) -> f32 {
    fx as f32 / SCALE_8_8
}

/// Signed 16.16 fixed point to float
pub fn sfixed32_to_f32(fx: i32) -> f32 {
    fx as f32 / SCALE_16_16
}

/// Float to unsigned 8.8, saturating at the representable range
pub fn f32_to_fixed16(value: f32) -> u16 {
    (value * SCALE_8_8).round().clamp(0.0, u16::MAX as f32) as u16
}

/// Float to signed 8.8, saturating at the representable range
pub fn f32_to_sfixed16(value: f32) -> i16 {
    (value * SCALE_8_8)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Float to signed 16.16, saturating at the representable range
pub fn f32_to_sfixed32(value: f32) -> i32 {
    // f32 -> i32 `as` casts saturate
    (value as f64 * SCALE_16_16 as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_fixed() {
        assert_eq!(fixed16_to_f32(0x0C80), 12.5);
        assert_eq!(fixed16_to_f32(0xFFFF), 255.0 + 255.0 / 256.0);
        assert_eq!(fixed32_to_f32(0x0003_4000), 3.25);
        assert_eq!(fixed32_to_f32(0), 0.0);
    }

    #[test]
    fn test_signed_fixed() {
        assert_eq!(sfixed16_to_f32(-384), -1.5);
        assert_eq!(sfixed32_to_f32(-0x0001_8000), -1.5);
        assert_eq!(f32_to_sfixed16(-1.5), -384);
        assert_eq!(f32_to_sfixed32(2.25), 0x0002_4000);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(f32_to_fixed16(-3.0), 0);
        assert_eq!(f32_to_fixed16(1000.0), u16::MAX);
        assert_eq!(f32_to_sfixed16(500.0), i16::MAX);
        assert_eq!(f32_to_sfixed32(-1.0e9), i32::MIN);
    }
}
