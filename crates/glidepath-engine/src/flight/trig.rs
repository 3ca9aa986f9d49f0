use std::f32::consts::TAU;

/// Number of entries in one turn of the quantized sine lookup.
const SINE_STEPS: u16 = 0x1000;

/// Sine of an angle given in 1/65536 turn units.
///
/// The angle is quantized to 4096 steps per turn (the low 4 bits are dropped), matching
/// the lookup-table sine the flight model is tuned for.
#[expect(clippy::cast_sign_loss)]
#[must_use]
pub fn sins(angle: i16) -> f32 {
    let index = (angle as u16) >> 4;
    (f32::from(index) * (TAU / f32::from(SINE_STEPS))).sin()
}

/// Moves `current` toward `target` by `inc` when below it or `dec` when above it,
/// without overshooting.
#[must_use]
pub fn approach_i32(current: i32, target: i32, inc: i32, dec: i32) -> i32 {
    if current < target {
        (current + inc).min(target)
    } else {
        (current - dec).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sins_cardinal_angles() {
        assert_eq!(sins(0), 0.0);
        assert!((sins(0x4000) - 1.0).abs() < 1e-6);
        assert!((sins(i16::MIN) - 0.0).abs() < 1e-6);
        assert!((sins(-0x4000) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sins_quantizes_low_bits() {
        assert_eq!(sins(0x1230), sins(0x123F));
        assert_ne!(sins(0x1230), sins(0x1240));
    }

    #[test]
    fn test_approach_does_not_overshoot() {
        assert_eq!(approach_i32(0, 100, 0x20, 0x40), 0x20);
        assert_eq!(approach_i32(90, 100, 0x20, 0x40), 100);
        assert_eq!(approach_i32(0, -100, 0x20, 0x40), -0x40);
        assert_eq!(approach_i32(-90, -100, 0x20, 0x40), -100);
        assert_eq!(approach_i32(7, 7, 0x20, 0x40), 7);
    }
}
