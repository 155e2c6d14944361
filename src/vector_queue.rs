//! Fixed-capacity ring buffer that overwrites on overflow.
//!
//! Positions come in two flavors: *logical* (0 is the front, `len() - 1` the
//! back) and *absolute* (slot index into the backing storage). Push operations
//! return the absolute slot they wrote to.

use crate::error::{Error, Result};
use core::ops::{Index, IndexMut};

pub struct VectorQueue<T> {
    data: Box<[Option<T>]>,
    head: usize,
    count: usize,
}
impl<T> VectorQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: (0..capacity).map(|_| None).collect(),
            head: 0,
            count: 0,
        }
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Absolute slot of the front element.
    #[inline(always)]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Absolute slot of the back element.
    pub fn tail(&self) -> Result<usize> {
        if self.count == 0 {
            return Err(Error::EmptyStorage);
        }

        Ok(self.abs(self.count - 1))
    }

    /// Absolute slot of logical position `pos`.
    ///
    /// Positions past the end wrap around the storage. Always 0 for a queue
    /// without capacity.
    #[inline]
    pub fn abs(&self, pos: usize) -> usize {
        let cap = self.data.len();
        if cap == 0 {
            return 0;
        }

        (self.head + pos % cap) % cap
    }

    pub fn at(&self, pos: usize) -> Result<&T> {
        if pos >= self.count {
            return Err(Error::InvalidSubscript);
        }

        self.data[self.abs(pos)]
            .as_ref()
            .ok_or(Error::InvalidSubscript)
    }

    pub fn at_mut(&mut self, pos: usize) -> Result<&mut T> {
        if pos >= self.count {
            return Err(Error::InvalidSubscript);
        }

        let p = self.abs(pos);
        self.data[p].as_mut().ok_or(Error::InvalidSubscript)
    }

    /// Slot `pos` of the backing storage, live or not.
    pub fn at_abs(&self, pos: usize) -> Result<Option<&T>> {
        match self.data.get(pos) {
            Some(slot) => Ok(slot.as_ref()),
            None => Err(Error::InvalidSubscript),
        }
    }

    pub fn at_abs_mut(&mut self, pos: usize) -> Result<Option<&mut T>> {
        match self.data.get_mut(pos) {
            Some(slot) => Ok(slot.as_mut()),
            None => Err(Error::InvalidSubscript),
        }
    }

    pub fn front(&self) -> Result<&T> {
        self.at(0).map_err(|_| Error::EmptyStorage)
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.at_mut(0).map_err(|_| Error::EmptyStorage)
    }

    pub fn back(&self) -> Result<&T> {
        match self.count {
            0 => Err(Error::EmptyStorage),
            n => self.at(n - 1),
        }
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        match self.count {
            0 => Err(Error::EmptyStorage),
            n => self.at_mut(n - 1),
        }
    }

    /// Appends `value` at the back. When full, the front element is
    /// overwritten and the front advances by one.
    ///
    /// Returns the absolute slot written.
    pub fn push_back(&mut self, value: T) -> Result<usize> {
        let cap = self.data.len();
        if cap == 0 {
            return Err(Error::NoCapacity);
        }

        if self.count < cap {
            let p = self.abs(self.count);
            self.data[p] = Some(value);
            self.count += 1;
            Ok(p)
        } else {
            let p = self.head;
            self.data[p] = Some(value);
            self.head = self.abs(1);
            Ok(p)
        }
    }

    /// Prepends `value` at the front. When full, the back element is
    /// overwritten.
    ///
    /// Returns the absolute slot written.
    pub fn push_front(&mut self, value: T) -> Result<usize> {
        let cap = self.data.len();
        if cap == 0 {
            return Err(Error::NoCapacity);
        }

        // on a full ring the slot before head is the back element
        self.head = (self.head + cap - 1) % cap;
        self.data[self.head] = Some(value);
        if self.count < cap {
            self.count += 1;
        }
        Ok(self.head)
    }

    pub fn pop_back(&mut self) -> Result<T> {
        if self.count == 0 {
            return Err(Error::EmptyStorage);
        }

        self.count -= 1;
        let p = self.abs(self.count);
        self.data[p].take().ok_or(Error::EmptyStorage)
    }

    pub fn pop_front(&mut self) -> Result<T> {
        if self.count == 0 {
            return Err(Error::EmptyStorage);
        }

        let v = self.data[self.head].take();
        self.head = self.abs(1);
        self.count -= 1;
        v.ok_or(Error::EmptyStorage)
    }

    /// Drops every live element. The head slot stays where it is.
    pub fn clear(&mut self) {
        for i in 0..self.count {
            let p = self.abs(i);
            self.data[p] = None;
        }
        self.count = 0;
    }

    /// Live elements, front to back.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        (0..self.count).map(move |i| match &self.data[self.abs(i)] {
            Some(v) => v,
            None => unreachable!("live slot {i} is vacant"),
        })
    }
}
impl<T> Default for VectorQueue<T> {
    /// A queue without capacity; what [`core::mem::take`] leaves behind.
    #[inline(always)]
    fn default() -> Self {
        Self::new(0)
    }
}
impl<T: Clone> Clone for VectorQueue<T> {
    /// Copies the live elements into the same slots; vacant slots stay vacant.
    fn clone(&self) -> Self {
        let mut data: Box<[Option<T>]> = (0..self.data.len()).map(|_| None).collect();
        for i in 0..self.count {
            let p = self.abs(i);
            data[p].clone_from(&self.data[p]);
        }

        Self {
            data,
            head: self.head,
            count: self.count,
        }
    }
}
impl<T> Index<usize> for VectorQueue<T> {
    type Output = T;

    /// # Panics
    /// If `pos` is not a live logical position.
    fn index(&self, pos: usize) -> &T {
        match self.at(pos) {
            Ok(v) => v,
            Err(e) => panic!("{e}: position {pos} in a queue of {}", self.count),
        }
    }
}
impl<T> IndexMut<usize> for VectorQueue<T> {
    fn index_mut(&mut self, pos: usize) -> &mut T {
        let count = self.count;
        match self.at_mut(pos) {
            Ok(v) => v,
            Err(e) => panic!("{e}: position {pos} in a queue of {count}"),
        }
    }
}
impl<T: core::fmt::Debug> core::fmt::Debug for VectorQueue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
impl<T: PartialEq> PartialEq for VectorQueue<T> {
    /// Compares the live elements only.
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}
