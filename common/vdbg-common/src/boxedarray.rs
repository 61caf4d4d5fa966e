//! Wrapper around `Box<[u8; LEN]>` with a custom `bincode::Decode` implementation that
//! deserializes directly into heap memory.
//!
//! The implementation that `#[derive(Decode)]` generates for `Box<[u8; LEN]>` deserializes into
//! stack memory and then moves to the heap, which overflows the stack for large arrays such as a
//! full 128 KiB VRAM image.

use bincode::de::read::Reader;
use bincode::de::{BorrowDecoder, Decoder};
use bincode::error::DecodeError;
use bincode::{BorrowDecode, Decode, Encode};
use std::ops::{Deref, DerefMut};

fn zeroed_array<const LEN: usize>() -> Box<[u8; LEN]> {
    vec![0; LEN]
        .into_boxed_slice()
        .try_into()
        .unwrap_or_else(|_| unreachable!("boxed slice always has length {LEN}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Encode)]
pub struct BoxedByteArray<const LEN: usize>(Box<[u8; LEN]>);

impl<const LEN: usize> BoxedByteArray<LEN> {
    #[must_use]
    pub fn new() -> Self {
        Self(zeroed_array())
    }

    /// Copy `bytes` into a new array. Returns `None` if `bytes` is not exactly `LEN` bytes long.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != LEN {
            return None;
        }

        let mut array = zeroed_array::<LEN>();
        array.copy_from_slice(bytes);
        Some(Self(array))
    }
}

impl<const LEN: usize> Default for BoxedByteArray<LEN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEN: usize> From<Box<[u8; LEN]>> for BoxedByteArray<LEN> {
    fn from(value: Box<[u8; LEN]>) -> Self {
        Self(value)
    }
}

impl<const LEN: usize> Deref for BoxedByteArray<LEN> {
    type Target = Box<[u8; LEN]>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const LEN: usize> DerefMut for BoxedByteArray<LEN> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const LEN: usize, Context> Decode<Context> for BoxedByteArray<LEN> {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let mut array = zeroed_array::<LEN>();
        decoder.reader().read(array.as_mut())?;
        Ok(Self(array))
    }
}

impl<'de, const LEN: usize, Context> BorrowDecode<'de, Context> for BoxedByteArray<LEN> {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        let mut array = zeroed_array::<LEN>();
        decoder.reader().read(array.as_mut())?;
        Ok(Self(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn from_slice_checks_length() {
        assert!(BoxedByteArray::<16>::from_slice(&[0; 15]).is_none());
        assert!(BoxedByteArray::<16>::from_slice(&[0; 17]).is_none());

        let array = BoxedByteArray::<4>::from_slice(&[1, 2, 3, 4]).unwrap();
        assert_eq!(**array, [1, 2, 3, 4]);
    }

    #[test]
    fn bincode_round_trip() {
        let mut array = BoxedByteArray::<0x20000>::new();
        array[0x1FFFF] = 0x5A;
        array[0] = 0xA5;

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&array, config).unwrap();
        let (decoded, _): (BoxedByteArray<0x20000>, _) =
            bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(decoded, array);
    }
}
