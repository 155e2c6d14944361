//! Streaming text codecs for binary blobs.
//!
//! Encoders and decoders are sessions: data may arrive in any number of
//! chunks and partial groups are carried over between calls.

pub mod base64;
pub mod hex;

pub use self::base64::{Base64Decoder, Base64Encoder};
pub use self::hex::{HexDecoder, HexEncoder};

/// A code unit of encoded text: ASCII/UTF-8 bytes, UTF-16 units or chars.
///
/// Decoders read input up to the first NUL unit, so both counted and
/// terminated strings can be passed as is.
pub trait TextUnit: Copy {
    fn code_point(self) -> u32;
}
impl TextUnit for u8 {
    #[inline(always)]
    fn code_point(self) -> u32 {
        self as _
    }
}
impl TextUnit for u16 {
    #[inline(always)]
    fn code_point(self) -> u32 {
        self as _
    }
}
impl TextUnit for char {
    #[inline(always)]
    fn code_point(self) -> u32 {
        self as _
    }
}

/// Iterates `data` up to the first NUL.
#[inline]
fn terminated<C: TextUnit>(data: &[C]) -> impl Iterator<Item = u32> + '_ {
    data.iter().map(|c| c.code_point()).take_while(|&c| c != 0)
}
