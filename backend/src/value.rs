use std::fmt::Debug;

use num_traits::{PrimInt, Unsigned};

/// Native plaintext slot type of bit-width [`SlotValue::WIDTH`].
///
/// A scheme's plaintext domain is addressed through `u64` words; conversion
/// to and from the native type reduces modulo `2^WIDTH`. Widths are capped
/// at 32 bits so that sums and products of two reduced words never overflow
/// the `u64` arithmetic the framework evaluates in.
pub trait SlotValue: PrimInt + Unsigned + Debug + Send + Sync + 'static {
    const WIDTH: u32;

    /// `2^WIDTH`, the modulus implied by the native type alone.
    fn native_modulus() -> u64 {
        1u64 << Self::WIDTH
    }

    fn to_word(self) -> u64;

    /// Truncating conversion: reduces `word` modulo `2^WIDTH`.
    fn from_word(word: u64) -> Self;
}

impl SlotValue for u8 {
    const WIDTH: u32 = 8;

    fn to_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Self {
        word as u8
    }
}

impl SlotValue for u16 {
    const WIDTH: u32 = 16;

    fn to_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Self {
        word as u16
    }
}

impl SlotValue for u32 {
    const WIDTH: u32 = 32;

    fn to_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Self {
        word as u32
    }
}

#[cfg(test)]
mod tests {
    use super::SlotValue;

    #[test]
    fn native_moduli() {
        assert_eq!(u8::native_modulus(), 256);
        assert_eq!(u16::native_modulus(), 1 << 16);
        assert_eq!(u32::native_modulus(), 1 << 32);
    }

    #[test]
    fn from_word_truncates() {
        assert_eq!(u8::from_word(260), 4);
        assert_eq!(u16::from_word(1 << 16), 0);
        assert_eq!(u32::from_word((1u64 << 32) + 7), 7);
    }
}
