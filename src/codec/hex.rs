//! Hexadecimal: uppercase on output, either case on input.

use super::{TextUnit, terminated};

#[derive(Debug, Clone, Copy, Default)]
pub struct HexEncoder;
impl HexEncoder {
    pub const fn new() -> Self {
        Self
    }

    /// Appends two uppercase digits per byte of `data` to `out`.
    pub fn encode(&self, out: &mut String, data: &[u8]) {
        out.push_str(&hex::encode_upper(data));
    }

    #[inline(always)]
    pub const fn enc_size(&self, size: usize) -> usize {
        size * 2
    }
}

#[derive(Debug, Clone, Default)]
pub struct HexDecoder {
    buf: u8,
    num: usize,
}
impl HexDecoder {
    pub const fn new() -> Self {
        Self { buf: 0, num: 0 }
    }

    /// Appends the bytes decoded from `data` to `out`.
    ///
    /// Non-digit characters are skipped and input ends at the first NUL.
    /// Returns `true` only when the last character consumed completed a byte;
    /// empty input, a trailing non-digit or a held lone digit yield `false`.
    pub fn decode<C: TextUnit>(&mut self, out: &mut Vec<u8>, data: &[C]) -> bool {
        out.reserve(self.dec_size(data.len()));

        let mut is_last = false;
        for c in terminated(data) {
            is_last = false;
            let Some(d) = char::from_u32(c).and_then(|c| c.to_digit(16)) else {
                continue;
            };
            self.buf = (self.buf << 4) | d as u8;
            self.num += 1;
            if self.num == 2 {
                out.push(self.buf);
                self.buf = 0;
                self.num = 0;
                is_last = true;
            }
        }

        is_last
    }

    /// Discards a held digit.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.buf = 0;
        self.num = 0;
    }

    /// Upper bound of bytes produced by decoding `size` more characters.
    #[inline(always)]
    pub const fn dec_size(&self, size: usize) -> usize {
        (self.num + size).div_ceil(2)
    }
}
