//! Concrete resource kinds for the host OS.

#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod win32;
