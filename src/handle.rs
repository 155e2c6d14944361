//! Exclusive ownership of a native resource value.
//!
//! A [`Handle`] owns exactly one native value (pointer, descriptor, opaque
//! struct pointer) of a resource kind described by [`Resource`]. The value is
//! released exactly once: when the handle is freed, re-attached or dropped.

use core::cmp::Ordering;
use core::fmt::Debug;

/// A kind of native resource: its raw value type, its "no resource" sentinel
/// and the operation returning a value to the OS.
pub trait Resource {
    type Raw: Copy + PartialEq;

    /// Value meaning "nothing owned".
    const INVALID: Self::Raw;

    /// Returns `raw` to the OS. Never called with [`Self::INVALID`].
    ///
    /// Failures are not reported to the owner; implementations log them.
    fn release(&self, raw: Self::Raw);

    /// Equality used by handle comparisons.
    ///
    /// Raw-value equality by default. Content-addressable kinds (where two
    /// distinct values may denote the same content) override this.
    #[inline(always)]
    fn raw_eq(&self, a: Self::Raw, b: Self::Raw) -> bool {
        a == b
    }

    /// Ordering used by handle comparisons. Must agree with [`Self::raw_eq`].
    #[inline(always)]
    fn raw_cmp(&self, a: Self::Raw, b: Self::Raw) -> Option<Ordering>
    where
        Self::Raw: PartialOrd,
    {
        a.partial_cmp(&b)
    }
}

/// Owning, move-only holder of a native resource value.
pub struct Handle<K: Resource> {
    raw: K::Raw,
    kind: K,
}
impl<K: Resource> Drop for Handle<K> {
    #[inline]
    fn drop(&mut self) {
        self.free();
    }
}
impl<K: Resource + Default> Default for Handle<K> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
impl<K: Resource + Default> Handle<K> {
    /// An empty handle.
    #[inline(always)]
    pub fn new() -> Self {
        Self::new_in(K::default())
    }

    /// Takes ownership of an already acquired value.
    ///
    /// # Safety
    /// `raw` must be a live value of this resource kind (or the invalid
    /// sentinel) that nothing else will release.
    #[inline(always)]
    pub unsafe fn from_raw(raw: K::Raw) -> Self {
        unsafe { Self::from_raw_in(raw, K::default()) }
    }
}
impl<K: Resource> Handle<K> {
    #[inline(always)]
    pub const fn new_in(kind: K) -> Self {
        Self {
            raw: K::INVALID,
            kind,
        }
    }

    /// # Safety
    /// Same contract as [`Handle::from_raw`].
    #[inline(always)]
    pub const unsafe fn from_raw_in(raw: K::Raw, kind: K) -> Self {
        Self { raw, kind }
    }

    #[inline(always)]
    pub const fn raw(&self) -> K::Raw {
        self.raw
    }

    #[inline(always)]
    pub const fn kind(&self) -> &K {
        &self.kind
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.raw != K::INVALID
    }

    /// Releases the currently owned value (if any) and takes ownership of `raw`.
    ///
    /// # Safety
    /// Same contract as [`Handle::from_raw`].
    #[inline]
    pub unsafe fn attach(&mut self, raw: K::Raw) {
        if self.raw != K::INVALID {
            self.kind.release(self.raw);
        }
        self.raw = raw;
    }

    /// Gives up ownership without releasing. The caller becomes responsible for
    /// the returned value.
    #[inline]
    #[must_use = "the detached value leaks unless it is released or re-attached"]
    pub fn detach(&mut self) -> K::Raw {
        core::mem::replace(&mut self.raw, K::INVALID)
    }

    /// Releases the owned value now. No-op on an empty handle.
    #[inline]
    pub fn free(&mut self) {
        if self.raw != K::INVALID {
            self.kind.release(self.raw);
            self.raw = K::INVALID;
        }
    }

    /// Frees the owned value and exposes the storage as an out-parameter for
    /// "create"-style calls that write a freshly acquired value.
    #[inline]
    pub fn as_out_ptr(&mut self) -> *mut K::Raw {
        self.free();
        &mut self.raw
    }

    /// Compares the owned value against `raw` with the kind's equality.
    #[inline]
    pub fn eq_raw(&self, raw: K::Raw) -> bool {
        self.kind.raw_eq(self.raw, raw)
    }

    /// Orders the owned value against `raw` with the kind's ordering.
    #[inline]
    pub fn cmp_raw(&self, raw: K::Raw) -> Option<Ordering>
    where
        K::Raw: PartialOrd,
    {
        self.kind.raw_cmp(self.raw, raw)
    }

    /// Moves ownership into a new handle, leaving this one empty.
    #[inline]
    pub fn take(&mut self) -> Self
    where
        K: Clone,
    {
        let raw = self.detach();

        unsafe { Self::from_raw_in(raw, self.kind.clone()) }
    }
}
impl<K: Resource> Debug for Handle<K>
where
    K::Raw: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Handle").field(&self.raw).finish()
    }
}
impl<K: Resource> PartialEq for Handle<K> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.kind.raw_eq(self.raw, other.raw)
    }
}
impl<K: Resource> PartialOrd for Handle<K>
where
    K::Raw: PartialOrd,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.kind.raw_cmp(self.raw, other.raw)
    }
}
