//! Base64 with the standard alphabet and `=` padding.

use super::{TextUnit, terminated};
use base64::{Engine as _, engine::general_purpose::STANDARD};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const PAD: u8 = 64;
const SKIP: u8 = 255;

/// Sextet value of each ASCII character, [`PAD`] for `=`, [`SKIP`] for
/// anything outside the alphabet.
const DECODE_TABLE: [u8; 256] = {
    let mut t = [SKIP; 256];
    let mut i = 0;
    while i < 64 {
        t[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    t[b'=' as usize] = PAD;
    t
};

#[derive(Debug, Clone, Default)]
pub struct Base64Encoder {
    buf: [u8; 3],
    num: usize,
}
impl Base64Encoder {
    pub const fn new() -> Self {
        Self { buf: [0; 3], num: 0 }
    }

    /// Appends the encoding of `data` to `out`.
    ///
    /// Bytes that do not complete a 3-byte group are held back until the next
    /// call, or flushed with padding when `is_last` is set.
    pub fn encode(&mut self, out: &mut String, data: &[u8], is_last: bool) {
        out.reserve(self.enc_size(data.len()));

        for &b in data {
            self.buf[self.num] = b;
            self.num += 1;
            if self.num == 3 {
                self.emit(out);
            }
        }
        if is_last && self.num > 0 {
            self.emit(out);
        }
    }

    /// Discards held back bytes.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.num = 0;
    }

    /// Upper bound of characters produced by encoding `size` more bytes.
    #[inline(always)]
    pub const fn enc_size(&self, size: usize) -> usize {
        (self.num + size).div_ceil(3) * 4
    }

    fn emit(&mut self, out: &mut String) {
        STANDARD.encode_string(&self.buf[..self.num], out);
        self.num = 0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Base64Decoder {
    buf: [u8; 4],
    num: usize,
}
impl Base64Decoder {
    pub const fn new() -> Self {
        Self { buf: [0; 4], num: 0 }
    }

    /// Appends the bytes decoded from `data` to `out`.
    ///
    /// Characters outside the alphabet are skipped and input ends at the first
    /// NUL. Returns `true` once a padded group has been decoded, meaning the
    /// encoded stream is complete; whatever follows it is not consumed.
    pub fn decode<C: TextUnit>(&mut self, out: &mut Vec<u8>, data: &[C]) -> bool {
        out.reserve(self.dec_size(data.len()));

        for c in terminated(data) {
            let v = match DECODE_TABLE.get(c as usize) {
                Some(&v) if v != SKIP => v,
                _ => continue,
            };
            self.buf[self.num] = v;
            self.num += 1;
            if self.num == 4 && self.emit(out) < 3 {
                return true;
            }
        }

        false
    }

    /// Discards a partially received group.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.num = 0;
    }

    /// Upper bound of bytes produced by decoding `size` more characters.
    #[inline(always)]
    pub const fn dec_size(&self, size: usize) -> usize {
        (self.num + size).div_ceil(4) * 3
    }

    fn emit(&mut self, out: &mut Vec<u8>) -> usize {
        let [s0, s1, s2, s3] = self.buf;
        self.num = 0;

        out.push((s0 << 2) | (s1 >> 4));
        if s2 >= PAD {
            return 1;
        }
        out.push((s1 << 4) | (s2 >> 2));
        if s3 >= PAD {
            return 2;
        }
        out.push((s2 << 6) | s3);
        3
    }
}
