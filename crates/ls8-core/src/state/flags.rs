//! Condition codes held in `FL`, laid out as `00000LGE`.

use std::cmp::Ordering;
use std::fmt;

/// Equal flag.
pub const FLAG_EQUAL: u8 = 1 << 0;
/// Greater-than flag.
pub const FLAG_GREATER: u8 = 1 << 1;
/// Less-than flag.
pub const FLAG_LESS: u8 = 1 << 2;
/// Mask of the meaningful `FL` bits.
pub const FLAGS_ACTIVE_MASK: u8 = FLAG_EQUAL | FLAG_GREATER | FLAG_LESS;

/// Compare result bitmask stored in `FL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Flags(u8);

impl Flags {
    /// Builds flags from a raw register value, keeping the active bits only.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & FLAGS_ACTIVE_MASK)
    }

    /// Flags produced by comparing `a` against `b`. Exactly one bit is set.
    #[must_use]
    pub fn compare(a: u8, b: u8) -> Self {
        Self::from_ordering(a.cmp(&b))
    }

    /// Flags for an already computed ordering of `a` relative to `b`.
    #[must_use]
    pub const fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self(FLAG_LESS),
            Ordering::Greater => Self(FLAG_GREATER),
            Ordering::Equal => Self(FLAG_EQUAL),
        }
    }

    /// Raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `E` bit.
    #[must_use]
    pub const fn equal(self) -> bool {
        self.0 & FLAG_EQUAL != 0
    }

    /// `G` bit.
    #[must_use]
    pub const fn greater(self) -> bool {
        self.0 & FLAG_GREATER != 0
    }

    /// `L` bit.
    #[must_use]
    pub const fn less(self) -> bool {
        self.0 & FLAG_LESS != 0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |set: bool, ch: char| if set { ch } else { '-' };
        write!(
            f,
            "{}{}{}",
            bit(self.less(), 'L'),
            bit(self.greater(), 'G'),
            bit(self.equal(), 'E')
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Flags, FLAG_EQUAL, FLAG_GREATER, FLAG_LESS};

    #[test]
    fn bit_layout_is_less_greater_equal_from_msb() {
        assert_eq!(FLAG_EQUAL, 0b001);
        assert_eq!(FLAG_GREATER, 0b010);
        assert_eq!(FLAG_LESS, 0b100);
    }

    #[test]
    fn compare_sets_expected_bit() {
        assert_eq!(Flags::compare(1, 2).bits(), FLAG_LESS);
        assert_eq!(Flags::compare(2, 1).bits(), FLAG_GREATER);
        assert_eq!(Flags::compare(7, 7).bits(), FLAG_EQUAL);
    }

    #[test]
    fn from_ordering_maps_each_ordering_to_one_flag() {
        use std::cmp::Ordering;

        assert_eq!(Flags::from_ordering(Ordering::Less).bits(), FLAG_LESS);
        assert_eq!(Flags::from_ordering(Ordering::Greater).bits(), FLAG_GREATER);
        assert_eq!(Flags::from_ordering(Ordering::Equal).bits(), FLAG_EQUAL);
    }

    #[test]
    fn display_renders_lge_mnemonic() {
        assert_eq!(Flags::compare(0, 1).to_string(), "L--");
        assert_eq!(Flags::compare(1, 0).to_string(), "-G-");
        assert_eq!(Flags::compare(1, 1).to_string(), "--E");
        assert_eq!(Flags::default().to_string(), "---");
    }

    #[test]
    fn from_bits_drops_inactive_bits() {
        assert_eq!(Flags::from_bits(0xFF).bits(), 0b111);
        assert_eq!(Flags::from_bits(0b1000).bits(), 0);
    }

    proptest! {
        #[test]
        fn compare_sets_exactly_one_flag(a in any::<u8>(), b in any::<u8>()) {
            let flags = Flags::compare(a, b);
            prop_assert_eq!(flags.bits().count_ones(), 1);
            prop_assert_eq!(flags.equal(), a == b);
            prop_assert_eq!(flags.less(), a < b);
            prop_assert_eq!(flags.greater(), a > b);
        }
    }
}
