//! Copy-by-duplication for resources the OS can clone.
//!
//! Each duplicate is an independent native value (a reference count bump, a
//! `dup(2)`, a `DuplicateHandle`) that is released on its own. The wrapper
//! keeps no shared count.

use crate::error::{Error, Result};
use crate::handle::{Handle, Resource};

pub trait DuplicableResource: Resource {
    /// Produces an independent value referencing the same resource as `raw`,
    /// or [`Resource::INVALID`] on failure. Never called with the sentinel.
    fn duplicate(&self, raw: Self::Raw) -> Self::Raw;
}

impl<K: DuplicableResource> Handle<K> {
    /// Returns a new owned raw value for the same resource, or the sentinel
    /// when empty or when duplication fails. Leaves `self` untouched.
    #[inline]
    #[must_use = "the duplicated value leaks unless it is released or attached"]
    pub fn duplicate(&self) -> K::Raw {
        if self.is_valid() {
            self.kind().duplicate(self.raw())
        } else {
            K::INVALID
        }
    }

    /// Frees the current value and takes ownership of a duplicate of `raw`.
    ///
    /// Attaching the sentinel leaves the handle empty and succeeds. On failure
    /// the handle is left empty.
    ///
    /// # Safety
    /// `raw` must be a live value of this resource kind (or the sentinel).
    /// Ownership of `raw` itself stays with the caller.
    pub unsafe fn attach_duplicated(&mut self, raw: K::Raw) -> Result<()> {
        self.free();
        if raw == K::INVALID {
            return Ok(());
        }

        match self.kind().duplicate(raw) {
            d if d == K::INVALID => Err(Error::DuplicationFailed),
            d => {
                unsafe { self.attach(d) };
                Ok(())
            }
        }
    }

    /// Recoverable form of [`Clone::clone`].
    pub fn try_clone(&self) -> Result<Self>
    where
        K: Clone,
    {
        let kind = self.kind().clone();
        if !self.is_valid() {
            return Ok(Self::new_in(kind));
        }

        match self.duplicate() {
            d if d == K::INVALID => Err(Error::DuplicationFailed),
            d => Ok(unsafe { Self::from_raw_in(d, kind) }),
        }
    }
}
impl<K: DuplicableResource + Clone> Clone for Handle<K> {
    /// Duplicates the resource.
    ///
    /// # Panics
    /// If the duplication hook fails for a valid handle.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(h) => h,
            Err(e) => panic!("{e}: cannot clone a live handle"),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if !source.is_valid() {
            self.free();
            return;
        }

        let d = source.duplicate();
        if d == K::INVALID {
            panic!("{}: cannot clone a live handle", Error::DuplicationFailed);
        }
        self.free();
        // the duplicate belongs to the source's kind from here on
        unsafe {
            *self = Self::from_raw_in(d, source.kind().clone());
        }
    }
}
