//! `format!` through the stack-then-heap buffer.
//!
//! Output that fits the stack buffer costs a single copy out of it. Longer
//! output is measured during the first pass, so the heap buffer is sized
//! exactly and formatting runs at most twice.

use crate::growing_buffer::{BufferElement, CallError, GrowError, GrowingCall};
use core::fmt;

/// Writes into a fixed slice, counting what did not fit.
struct SliceWriter<'b, T> {
    buf: &'b mut [T],
    required: usize,
}
impl<'b, T: BufferElement> SliceWriter<'b, T> {
    fn new(buf: &'b mut [T]) -> Self {
        Self { buf, required: 0 }
    }

    fn put(&mut self, units: impl ExactSizeIterator<Item = T>) {
        let end = self.required + units.len();
        // once anything overflowed only the count matters
        if end <= self.buf.len() {
            for (d, s) in self.buf[self.required..end].iter_mut().zip(units) {
                *d = s;
            }
        }
        self.required = end;
    }
}
impl fmt::Write for SliceWriter<'_, u8> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.bytes());
        Ok(())
    }
}
impl fmt::Write for SliceWriter<'_, u16> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.put(units.into_iter());
        Ok(())
    }
}

fn render<T: BufferElement>(buf: &mut [T], args: fmt::Arguments<'_>) -> Result<usize, CallError<fmt::Error>>
where
    for<'b> SliceWriter<'b, T>: fmt::Write,
{
    let capacity = buf.len();
    let mut w = SliceWriter::new(buf);
    fmt::write(&mut w, args).map_err(CallError::Failed)?;

    match w.required {
        n if n > capacity => Err(CallError::MoreData { required: Some(n) }),
        n => Ok(n),
    }
}

impl GrowingCall {
    /// Formats `args` into a `String`.
    ///
    /// Fails only when a `Display` implementation reports an error or the
    /// output exceeds the configured limits.
    pub fn format(&self, args: fmt::Arguments<'_>) -> Result<String, GrowError<fmt::Error>> {
        let bytes = self.call(|buf: &mut [u8]| render(buf, args))?;

        Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            // whole `str` pieces only ever land in the buffer
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Formats `args` as UTF-16, without a terminator.
    pub fn format_wide(&self, args: fmt::Arguments<'_>) -> Result<Vec<u16>, GrowError<fmt::Error>> {
        self.call(|buf: &mut [u16]| render(buf, args))
    }
}

/// [`GrowingCall::format`] with default limits.
#[inline]
pub fn format_growing(args: fmt::Arguments<'_>) -> Result<String, GrowError<fmt::Error>> {
    GrowingCall::new().format(args)
}

/// [`GrowingCall::format_wide`] with default limits.
#[inline]
pub fn format_growing_wide(args: fmt::Arguments<'_>) -> Result<Vec<u16>, GrowError<fmt::Error>> {
    GrowingCall::new().format_wide(args)
}

/// `format!` into a growing buffer. Evaluates to
/// `Result<String, GrowError<fmt::Error>>`.
#[macro_export]
macro_rules! growing_format {
    ($($arg:tt)*) => {
        $crate::format::format_growing(::core::format_args!($($arg)*))
    };
}

/// UTF-16 flavor of [`growing_format!`].
#[macro_export]
macro_rules! growing_format_wide {
    ($($arg:tt)*) => {
        $crate::format::format_growing_wide(::core::format_args!($($arg)*))
    };
}
