//! Stack-then-heap retry for calls with unknown output size.
//!
//! Many OS calls take a caller-supplied buffer and report "too small" (often
//! along with the size they need). [`GrowingCall`] tries a fixed stack buffer
//! first and only falls back to the heap when the call asks for more room.
//!
//! All lengths here are counted in elements of the buffer type, never in
//! bytes. Calls that speak bytes convert with [`bytes_to_elements`] and
//! [`elements_to_bytes`].

use thiserror::Error;

include!(concat!(env!("OUT_DIR"), "/stack_buffer.rs"));

/// Calls attempted (stack attempt included) before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 16;
/// Largest heap buffer that will be allocated.
pub const DEFAULT_MAX_BYTES: usize = 64 << 20;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Code units a growing buffer can hold: bytes, UTF-16 and UTF-32 units.
pub trait BufferElement:
    Copy + Default + PartialEq + core::fmt::Debug + sealed::Sealed + 'static
{
    #[doc(hidden)]
    type Stack: AsMut<[Self]>;

    #[doc(hidden)]
    fn stack() -> Self::Stack;
}
impl BufferElement for u8 {
    type Stack = [u8; STACK_BUFFER_BYTES];

    #[inline(always)]
    fn stack() -> Self::Stack {
        [0; STACK_BUFFER_BYTES]
    }
}
impl BufferElement for u16 {
    type Stack = [u16; STACK_BUFFER_BYTES / 2];

    #[inline(always)]
    fn stack() -> Self::Stack {
        [0; STACK_BUFFER_BYTES / 2]
    }
}
impl BufferElement for u32 {
    type Stack = [u32; STACK_BUFFER_BYTES / 4];

    #[inline(always)]
    fn stack() -> Self::Stack {
        [0; STACK_BUFFER_BYTES / 4]
    }
}

/// Number of `T` elements in the stack buffer.
#[inline(always)]
pub const fn stack_capacity<T: BufferElement>() -> usize {
    STACK_BUFFER_BYTES / core::mem::size_of::<T>()
}

/// Byte count reported by a call to element count, rounding partial units up.
#[inline(always)]
pub const fn bytes_to_elements<T: BufferElement>(bytes: usize) -> usize {
    bytes.div_ceil(core::mem::size_of::<T>())
}

#[inline(always)]
pub const fn elements_to_bytes<T: BufferElement>(elements: usize) -> usize {
    elements * core::mem::size_of::<T>()
}

/// How a single attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError<E> {
    /// The buffer was too small. `required` is the element count the call
    /// asked for, when it said so.
    MoreData { required: Option<usize> },
    /// Any other failure. Returned to the caller as is, without retrying.
    Failed(E),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrowError<E> {
    #[error("{0}")]
    Call(E),

    #[error("buffer still too small after {attempts} attempts (last tried {elements} elements)")]
    LimitExceeded { attempts: usize, elements: usize },
}

/// Growth limits for a retrying call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowingCall {
    max_attempts: usize,
    max_bytes: usize,
}
impl Default for GrowingCall {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
impl GrowingCall {
    pub const fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub const fn with_max_attempts(self, max_attempts: usize) -> Self {
        Self {
            max_attempts,
            ..self
        }
    }

    pub const fn with_max_bytes(self, max_bytes: usize) -> Self {
        Self { max_bytes, ..self }
    }

    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Runs `f` on the stack buffer, then on heap buffers for as long as it
    /// reports [`CallError::MoreData`].
    ///
    /// `f` returns the number of elements it produced. A heap buffer is sized
    /// to the reported requirement, or double the previous capacity when the
    /// call did not say how much it needs. A count beyond the buffer it was
    /// given is clamped to that buffer, on the stack and heap alike.
    pub fn call<T, E, F>(&self, mut f: F) -> Result<Vec<T>, GrowError<E>>
    where
        T: BufferElement,
        F: FnMut(&mut [T]) -> Result<usize, CallError<E>>,
    {
        let mut stack = T::stack();
        let stack = stack.as_mut();
        let capacity = stack.len();

        match f(stack) {
            Ok(n) => Ok(exact(stack, n).to_vec()),
            Err(CallError::Failed(e)) => Err(GrowError::Call(e)),
            Err(CallError::MoreData { required }) => self.grow(capacity, required, 1, f),
        }
    }

    /// Asks `query` for the element count first, then fills a buffer of that
    /// size: the stack buffer when it fits, an exactly sized heap buffer
    /// otherwise.
    ///
    /// A zero size is an empty result and `fill` is not called. If the data
    /// grows between the two calls, `fill` may still report
    /// [`CallError::MoreData`] and the usual growth applies.
    pub fn query_then_fill<T, E, Q, F>(&self, query: Q, mut fill: F) -> Result<Vec<T>, GrowError<E>>
    where
        T: BufferElement,
        Q: FnOnce() -> Result<usize, E>,
        F: FnMut(&mut [T]) -> Result<usize, CallError<E>>,
    {
        let required = query().map_err(GrowError::Call)?;
        if required == 0 {
            return Ok(Vec::new());
        }

        let capacity = stack_capacity::<T>();
        if required > capacity {
            return self.grow(capacity, Some(required), 0, fill);
        }

        let mut stack = T::stack();
        let stack = stack.as_mut();
        match fill(stack) {
            Ok(n) => Ok(exact(stack, n).to_vec()),
            Err(CallError::Failed(e)) => Err(GrowError::Call(e)),
            Err(CallError::MoreData { required }) => self.grow(capacity, required, 1, fill),
        }
    }

    fn grow<T, E, F>(
        &self,
        mut capacity: usize,
        mut required: Option<usize>,
        mut attempts: usize,
        mut f: F,
    ) -> Result<Vec<T>, GrowError<E>>
    where
        T: BufferElement,
        F: FnMut(&mut [T]) -> Result<usize, CallError<E>>,
    {
        let max_elements = self.max_bytes / core::mem::size_of::<T>();

        loop {
            capacity = match required {
                Some(n) if n > capacity => n,
                // nothing reported, or a size that already proved too small
                _ => capacity.saturating_mul(2).max(1),
            };
            if attempts >= self.max_attempts || capacity > max_elements {
                return Err(GrowError::LimitExceeded {
                    attempts,
                    elements: capacity,
                });
            }

            let mut heap = vec![T::default(); capacity];
            attempts += 1;
            match f(&mut heap) {
                Ok(n) => {
                    heap.truncate(n);
                    heap.shrink_to_fit();
                    return Ok(heap);
                }
                Err(CallError::Failed(e)) => return Err(GrowError::Call(e)),
                Err(CallError::MoreData { required: r }) => required = r,
            }
        }
    }
}

#[inline(always)]
fn exact<T>(buf: &[T], n: usize) -> &[T] {
    &buf[..n.min(buf.len())]
}

/// [`GrowingCall::call`] with default limits.
#[inline]
pub fn call_growing<T, E, F>(f: F) -> Result<Vec<T>, GrowError<E>>
where
    T: BufferElement,
    F: FnMut(&mut [T]) -> Result<usize, CallError<E>>,
{
    GrowingCall::new().call(f)
}

/// [`GrowingCall::query_then_fill`] with default limits.
#[inline]
pub fn query_then_fill<T, E, Q, F>(query: Q, fill: F) -> Result<Vec<T>, GrowError<E>>
where
    T: BufferElement,
    Q: FnOnce() -> Result<usize, E>,
    F: FnMut(&mut [T]) -> Result<usize, CallError<E>>,
{
    GrowingCall::new().query_then_fill(query, fill)
}

/// Drops a single trailing NUL terminator, if present.
#[inline]
pub fn trim_nul<T: BufferElement>(mut v: Vec<T>) -> Vec<T> {
    if v.last() == Some(&T::default()) {
        v.pop();
    }
    v
}

/// Cuts at the first NUL, for calls that only promise a terminated string
/// somewhere inside the buffer.
#[inline]
pub fn until_nul<T: BufferElement>(mut v: Vec<T>) -> Vec<T> {
    if let Some(p) = v.iter().position(|c| *c == T::default()) {
        v.truncate(p);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    /// Behaves like a typical "copy into caller buffer" API: copies `src` when
    /// it fits, otherwise fails and reports the needed size.
    fn copy_out<T: BufferElement>(
        src: &[T],
        buf: &mut [T],
        calls: &Cell<usize>,
    ) -> Result<usize, CallError<u32>> {
        calls.set(calls.get() + 1);
        if src.len() > buf.len() {
            return Err(CallError::MoreData {
                required: Some(src.len()),
            });
        }
        buf[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| b'a' + (i % 26) as u8).collect()
    }

    #[rstest]
    #[case(0)]
    #[case(10)]
    #[case(stack_capacity::<u8>() - 1)]
    #[case(stack_capacity::<u8>())]
    #[case(stack_capacity::<u8>() + 1)]
    #[case(2000)]
    #[case(5000)]
    fn stack_and_heap_paths_agree(#[case] len: usize) {
        let src = pattern(len);
        let calls = Cell::new(0);
        let out = call_growing(|buf: &mut [u8]| copy_out(&src, buf, &calls)).unwrap();

        assert_eq!(out, src);
        assert_eq!(out.len(), len);
        let expected_calls = if len <= stack_capacity::<u8>() { 1 } else { 2 };
        assert_eq!(calls.get(), expected_calls);
    }

    #[test]
    fn two_thousand_bytes_take_exactly_one_heap_retry() {
        let src = pattern(2000);
        let calls = Cell::new(0);
        let out = call_growing(|buf: &mut [u8]| copy_out(&src, buf, &calls)).unwrap();
        assert_eq!(out.len(), 2000);
        assert_eq!(out, src);
        assert_eq!(calls.get(), if 2000 > stack_capacity::<u8>() { 2 } else { 1 });
    }

    #[test]
    fn wide_lengths_are_counted_in_elements() {
        assert_eq!(stack_capacity::<u16>(), STACK_BUFFER_BYTES / 2);
        let src: Vec<u16> = "\u{00e9}t\u{00e9}".encode_utf16().cycle().take(600).collect();
        let calls = Cell::new(0);
        let out = call_growing(|buf: &mut [u16]| copy_out(&src, buf, &calls)).unwrap();
        assert_eq!(out, src);
        assert_eq!(calls.get(), if 600 > stack_capacity::<u16>() { 2 } else { 1 });
    }

    #[test]
    fn unknown_size_doubles_from_twice_the_stack() {
        let src = pattern(5000);
        let capacities = std::cell::RefCell::new(Vec::new());
        let out = call_growing(|buf: &mut [u8]| {
            capacities.borrow_mut().push(buf.len());
            if src.len() > buf.len() {
                return Err(CallError::<u32>::MoreData { required: None });
            }
            buf[..src.len()].copy_from_slice(&src);
            Ok(src.len())
        })
        .unwrap();

        assert_eq!(out, src);
        let cap = stack_capacity::<u8>();
        let mut expected = vec![cap];
        while *expected.last().unwrap() < 5000 {
            let next = expected.last().unwrap() * 2;
            expected.push(next);
        }
        assert_eq!(*capacities.borrow(), expected);
    }

    #[test]
    fn other_errors_propagate_without_retry() {
        let calls = Cell::new(0);
        let r = call_growing(|_: &mut [u8]| {
            calls.set(calls.get() + 1);
            Err(CallError::Failed(5u32))
        });
        assert_eq!(r, Err(GrowError::Call(5)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn growth_is_bounded_by_attempts() {
        let calls = Cell::new(0);
        let r = GrowingCall::new()
            .with_max_attempts(3)
            .call(|_: &mut [u8]| {
                calls.set(calls.get() + 1);
                Err(CallError::<u32>::MoreData { required: None })
            });
        assert!(matches!(r, Err(GrowError::LimitExceeded { attempts: 3, .. })));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn growth_is_bounded_by_size() {
        let calls = Cell::new(0);
        let r = GrowingCall::new()
            .with_max_bytes(1 << 20)
            .call(|_: &mut [u16]| {
                calls.set(calls.get() + 1);
                Err(CallError::<u32>::MoreData {
                    required: Some(1 << 30),
                })
            });
        assert_eq!(
            r,
            Err(GrowError::LimitExceeded {
                attempts: 1,
                elements: 1 << 30
            })
        );
        assert_eq!(calls.get(), 1);
    }

    #[rstest]
    #[case(None, stack_capacity::<u8>())]
    #[case(Some(stack_capacity::<u8>() * 2), stack_capacity::<u8>() * 2)]
    fn over_reported_count_is_clamped_on_both_paths(
        #[case] required: Option<usize>,
        #[case] expected: usize,
    ) {
        let calls = Cell::new(0);
        let out = call_growing(|buf: &mut [u8]| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 && required.is_some() {
                return Err(CallError::<u32>::MoreData { required });
            }
            buf.fill(b'z');
            Ok(buf.len() + 5)
        })
        .unwrap();
        assert_eq!(out.len(), expected);
        assert!(out.iter().all(|&b| b == b'z'));
    }

    #[test]
    fn data_growing_between_calls_is_retried() {
        // the "registry value" gets longer right after the first size report
        let sizes = [1500usize, 3000];
        let calls = Cell::new(0);
        let out = call_growing(|buf: &mut [u8]| {
            let current = sizes[calls.get().min(1)];
            calls.set(calls.get() + 1);
            if current > buf.len() {
                return Err(CallError::<u32>::MoreData {
                    required: Some(sizes[0]),
                });
            }
            buf[..current].fill(b'x');
            Ok(current)
        })
        .unwrap();
        assert_eq!(out.len(), 3000);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn query_then_fill_sizes_exactly() {
        let src = pattern(3000);
        let fill_lengths = std::cell::RefCell::new(Vec::new());
        let out = query_then_fill(
            || Ok::<_, u32>(src.len()),
            |buf: &mut [u8]| {
                fill_lengths.borrow_mut().push(buf.len());
                buf[..src.len()].copy_from_slice(&src);
                Ok(src.len())
            },
        )
        .unwrap();
        assert_eq!(out, src);
        assert_eq!(*fill_lengths.borrow(), [3000]);
    }

    #[test]
    fn query_then_fill_small_uses_stack() {
        let src = pattern(10);
        let calls = Cell::new(0);
        let out = query_then_fill(
            || Ok(src.len()),
            |buf: &mut [u8]| copy_out(&src, buf, &calls),
        )
        .unwrap();
        assert_eq!(out, src);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn query_then_fill_zero_is_empty() {
        let calls = Cell::new(0);
        let out = query_then_fill(
            || Ok::<_, u32>(0),
            |buf: &mut [u16]| copy_out(&[], buf, &calls),
        )
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn query_errors_propagate() {
        let r = query_then_fill(|| Err(87u32), |_: &mut [u8]| Ok(0));
        assert_eq!(r, Err(GrowError::Call(87)));
    }

    #[test]
    fn terminators() {
        assert_eq!(trim_nul(b"abc\0".to_vec()), b"abc");
        assert_eq!(trim_nul(b"abc".to_vec()), b"abc");
        assert_eq!(trim_nul(Vec::<u16>::new()), Vec::<u16>::new());
        // binary data keeps embedded zeros
        assert_eq!(trim_nul(b"a\0b\0\0".to_vec()), b"a\0b\0");
        assert_eq!(until_nul(vec![0x41u16, 0x42, 0, 0x43, 0]), [0x41, 0x42]);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(bytes_to_elements::<u16>(10), 5);
        assert_eq!(bytes_to_elements::<u16>(11), 6);
        assert_eq!(bytes_to_elements::<u32>(4), 1);
        assert_eq!(elements_to_bytes::<u16>(5), 10);
        assert_eq!(stack_capacity::<u32>() * 4, STACK_BUFFER_BYTES);
    }
}
