use std::ops::RangeInclusive;

pub trait GetBit {
    #[must_use]
    fn bit(self, i: u8) -> bool;

    #[must_use]
    fn bits(self, range: RangeInclusive<u8>) -> Self;
}

/// Bit-level read-modify-write helpers. Only the bits in the given position or range are replaced;
/// every other bit of the original value is preserved.
pub trait SetBits: Sized {
    #[must_use]
    fn with_bit(self, i: u8, value: bool) -> Self;

    /// Replace the bits in `range` with the low bits of `value`. Bits of `value` that do not fit
    /// in the range are discarded.
    #[must_use]
    fn with_bits(self, range: RangeInclusive<u8>, value: Self) -> Self;
}

macro_rules! impl_bit_traits {
    ($t:ty) => {
        impl GetBit for $t {
            #[inline]
            fn bit(self, i: u8) -> bool {
                debug_assert!(i < (<$t>::BITS as u8));
                self & (1 << i) != 0
            }

            #[inline]
            fn bits(self, range: RangeInclusive<u8>) -> Self {
                let start = *range.start();
                let end = *range.end();
                debug_assert!(start <= end && end < (<$t>::BITS as u8));

                let mask = <$t>::MAX >> (<$t>::BITS as u8 - (end - start + 1));
                (self >> start) & mask
            }
        }

        impl SetBits for $t {
            #[inline]
            fn with_bit(self, i: u8, value: bool) -> Self {
                debug_assert!(i < (<$t>::BITS as u8));
                (self & !(1 << i)) | (<$t>::from(value) << i)
            }

            #[inline]
            fn with_bits(self, range: RangeInclusive<u8>, value: Self) -> Self {
                let start = *range.start();
                let end = *range.end();
                debug_assert!(start <= end && end < (<$t>::BITS as u8));

                let mask = (<$t>::MAX >> (<$t>::BITS as u8 - (end - start + 1))) << start;
                (self & !mask) | ((value << start) & mask)
            }
        }
    };
}

impl_bit_traits!(u8);
impl_bit_traits!(u16);
impl_bit_traits!(u32);

pub trait U16Ext {
    fn lsb(self) -> u8;

    fn msb(self) -> u8;

    fn set_lsb(&mut self, value: u8);

    fn set_msb(&mut self, value: u8);

    fn from_le_pair(lsb: u8, msb: u8) -> Self;
}

impl U16Ext for u16 {
    #[inline(always)]
    fn lsb(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    fn msb(self) -> u8 {
        (self >> 8) as u8
    }

    #[inline(always)]
    fn set_lsb(&mut self, value: u8) {
        *self = (*self & 0xFF00) | u16::from(value);
    }

    #[inline(always)]
    fn set_msb(&mut self, value: u8) {
        *self = (*self & 0x00FF) | (u16::from(value) << 8);
    }

    #[inline(always)]
    fn from_le_pair(lsb: u8, msb: u8) -> Self {
        u16::from_le_bytes([lsb, msb])
    }
}

/// Sign-extend the low `bits` bits of `value`.
#[inline]
#[must_use]
pub fn sign_extend(value: u16, bits: u8) -> i16 {
    debug_assert!((1..=16).contains(&bits));
    let shift = 16 - bits;
    ((value << shift) as i16) >> shift
}
