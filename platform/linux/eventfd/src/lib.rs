#![cfg(target_os = "linux")]

use std::os::fd::{AsRawFd, IntoRawFd, RawFd};

use bitflags::bitflags;
use handle_kit::platform::unix::FileDescriptor;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventFDOptions : core::ffi::c_int {
        const CLOEXEC = libc::EFD_CLOEXEC;
        const NONBLOCK = libc::EFD_NONBLOCK;
        const SEMAPHORE = libc::EFD_SEMAPHORE;
    }
}

/// Kernel event counter. Clones are duplicated descriptors sharing one counter.
#[derive(Debug, Clone)]
#[repr(transparent)]
pub struct EventFD(FileDescriptor);
impl AsRawFd for EventFD {
    #[inline(always)]
    fn as_raw_fd(&self) -> RawFd {
        self.0.raw()
    }
}
impl IntoRawFd for EventFD {
    #[inline(always)]
    fn into_raw_fd(mut self) -> RawFd {
        self.0.detach()
    }
}
impl EventFD {
    #[inline]
    pub fn new(init: core::ffi::c_uint, options: EventFDOptions) -> std::io::Result<Self> {
        match unsafe { libc::eventfd(init, options.bits()) } {
            -1 => Err(std::io::Error::last_os_error()),
            fd => Ok(Self(unsafe { FileDescriptor::from_raw(fd) })),
        }
    }

    /// Reads and resets the counter (or decrements it by one in semaphore mode).
    #[inline]
    pub fn take(&self) -> std::io::Result<u64> {
        let mut sink = core::mem::MaybeUninit::<u64>::uninit();
        match unsafe { libc::read(self.0.raw(), sink.as_mut_ptr() as _, core::mem::size_of::<u64>()) } {
            -1 => Err(std::io::Error::last_os_error()),
            8 => Ok(unsafe { sink.assume_init() }),
            r => Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("eventfd read returned {r} bytes"),
            )),
        }
    }

    #[inline]
    pub fn add(&self, val: u64) -> std::io::Result<()> {
        match unsafe { libc::write(self.0.raw(), &val as *const _ as _, core::mem::size_of::<u64>()) } {
            -1 => Err(std::io::Error::last_os_error()),
            _ => Ok(()),
        }
    }
}
