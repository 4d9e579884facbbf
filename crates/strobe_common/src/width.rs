//! Bit-width arithmetic for pin values.

/// The widest pin the engine models. Pin state is held in a `u64`.
pub const MAX_PIN_WIDTH: u32 = 64;

/// Returns the all-ones mask for a pin of `width` bits.
///
/// `width` must be in `1..=MAX_PIN_WIDTH`; wider values saturate to the full
/// 64-bit mask.
pub fn mask(width: u32) -> u64 {
    if width >= MAX_PIN_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Returns `true` if `value` is representable in `width` bits.
pub fn fits_width(value: u64, width: u32) -> bool {
    value & !mask(width) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bit_mask() {
        assert_eq!(mask(1), 0b1);
    }

    #[test]
    fn byte_mask() {
        assert_eq!(mask(8), 0xFF);
    }

    #[test]
    fn full_width_mask() {
        assert_eq!(mask(64), u64::MAX);
        assert_eq!(mask(63), u64::MAX >> 1);
    }

    #[test]
    fn fits() {
        assert!(fits_width(0xFF, 8));
        assert!(!fits_width(0x100, 8));
        assert!(fits_width(1, 1));
        assert!(!fits_width(2, 1));
        assert!(fits_width(u64::MAX, 64));
    }
}
