//! Fixed-point math utilities for deterministic simulation.
//!
//! All fractional simulation values (movement costs, influence,
//! tactical penalties) use fixed-point arithmetic so two runs of the
//! same match produce bit-identical decisions on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// One half, exactly.
pub const HALF: Fixed = Fixed::from_bits(1 << 31);

/// Build a fixed-point ratio `num / den` without going through floats.
///
/// Returns zero when `den` is zero.
#[must_use]
pub fn ratio(num: u32, den: u32) -> Fixed {
    if den == 0 {
        return Fixed::ZERO;
    }
    Fixed::from_num(num) / Fixed::from_num(den)
}

/// Round a movement cost up to whole movement points.
///
/// Partial points still consume a full point.
#[must_use]
pub fn ceil_points(cost: Fixed) -> u32 {
    if cost <= Fixed::ZERO {
        return 0;
    }
    cost.ceil().to_num::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_is_exact() {
        assert_eq!(HALF + HALF, Fixed::ONE);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(1, 2), HALF);
        assert_eq!(ratio(7, 0), Fixed::ZERO);
        assert_eq!(ratio(10, 10), Fixed::ONE);
    }

    #[test]
    fn test_ceil_points_rounds_partial_up() {
        assert_eq!(ceil_points(Fixed::ZERO), 0);
        assert_eq!(ceil_points(Fixed::ONE), 1);
        assert_eq!(ceil_points(Fixed::ONE + HALF), 2);
        assert_eq!(ceil_points(Fixed::from_num(3)), 3);
    }

    #[test]
    fn test_fixed_determinism() {
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a * Fixed::from_num(7), b * Fixed::from_num(7));
    }
}
