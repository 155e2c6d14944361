//! Storage for secrets that is wiped before its memory is given back.

use zeroize::{Zeroize, Zeroizing};

/// Byte vector wiped on drop.
pub type SanitizingVec = Zeroizing<Vec<u8>>;

/// String wiped on drop.
pub type SanitizingString = Zeroizing<String>;

/// Fixed-size secret: zeroed when created, wiped when dropped.
pub struct SanitizingBlob<const N: usize> {
    data: [u8; N],
}
impl<const N: usize> SanitizingBlob<N> {
    #[inline(always)]
    pub const fn new() -> Self {
        Self { data: [0; N] }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.data
    }

    #[inline(always)]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.data
    }

    /// Zeroes the contents now.
    #[inline]
    pub fn wipe(&mut self) {
        self.data.zeroize();
    }
}
impl<const N: usize> Default for SanitizingBlob<N> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
impl<const N: usize> Drop for SanitizingBlob<N> {
    fn drop(&mut self) {
        self.wipe();
    }
}
impl<const N: usize> From<[u8; N]> for SanitizingBlob<N> {
    /// Takes a copy of `data` and wipes the source array.
    fn from(mut data: [u8; N]) -> Self {
        let blob = Self { data };
        data.zeroize();
        blob
    }
}
impl<const N: usize> core::fmt::Debug for SanitizingBlob<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SanitizingBlob<{}>(..)", N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let b = SanitizingBlob::<32>::new();
        assert!(b.as_bytes().iter().all(|&x| x == 0));
        assert_eq!(b.len(), 32);
        assert!(!b.is_empty());
    }

    #[test]
    fn wipe_clears_contents() {
        let mut b = SanitizingBlob::from(*b"hunter2!");
        assert_eq!(b.as_bytes(), b"hunter2!");
        b.as_bytes_mut()[0] = b'H';
        b.wipe();
        assert_eq!(b.as_bytes(), &[0; 8]);
    }

    #[test]
    fn debug_hides_contents() {
        let b = SanitizingBlob::from([0xaa; 4]);
        assert_eq!(format!("{b:?}"), "SanitizingBlob<4>(..)");
    }

    #[test]
    fn vec_alias_derefs() {
        let mut v = SanitizingVec::new(Vec::new());
        v.extend_from_slice(b"secret");
        assert_eq!(v.as_slice(), b"secret");
    }
}
