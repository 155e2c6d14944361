//! File descriptors.

use crate::dplhandle::DuplicableResource;
use crate::handle::{Handle, Resource};
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};

/// Any file descriptor. Released with `close(2)`, duplicated with
/// `fcntl(F_DUPFD_CLOEXEC)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fd;
impl Resource for Fd {
    type Raw = RawFd;
    const INVALID: RawFd = -1;

    fn release(&self, raw: RawFd) {
        if unsafe { libc::close(raw) } < 0 {
            tracing::warn!(fd = raw, reason = ?std::io::Error::last_os_error(), "closing fd failed");
        }
    }
}
impl DuplicableResource for Fd {
    fn duplicate(&self, raw: RawFd) -> RawFd {
        match unsafe { libc::fcntl(raw, libc::F_DUPFD_CLOEXEC, 0) } {
            -1 => {
                tracing::warn!(fd = raw, reason = ?std::io::Error::last_os_error(), "duplicating fd failed");
                Self::INVALID
            }
            fd => fd,
        }
    }
}

pub type FileDescriptor = Handle<Fd>;

impl AsRawFd for Handle<Fd> {
    #[inline(always)]
    fn as_raw_fd(&self) -> RawFd {
        self.raw()
    }
}
impl IntoRawFd for Handle<Fd> {
    #[inline(always)]
    fn into_raw_fd(mut self) -> RawFd {
        self.detach()
    }
}

/// Creates an anonymous pipe, returning `(read end, write end)`.
pub fn pipe() -> std::io::Result<(FileDescriptor, FileDescriptor)> {
    let mut fds = [-1; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } < 0 {
        return Err(std::io::Error::last_os_error());
    }

    unsafe { Ok((FileDescriptor::from_raw(fds[0]), FileDescriptor::from_raw(fds[1]))) }
}

/// `write(2)` of the whole of `data` in one call.
pub fn write(fd: &impl AsRawFd, data: &[u8]) -> std::io::Result<usize> {
    match unsafe { libc::write(fd.as_raw_fd(), data.as_ptr() as _, data.len()) } {
        n if n < 0 => Err(std::io::Error::last_os_error()),
        n => Ok(n as usize),
    }
}

/// `read(2)` into `buf`. Zero means end of file.
pub fn read(fd: &impl AsRawFd, buf: &mut [u8]) -> std::io::Result<usize> {
    match unsafe { libc::read(fd.as_raw_fd(), buf.as_mut_ptr() as _, buf.len()) } {
        n if n < 0 => Err(std::io::Error::last_os_error()),
        n => Ok(n as usize),
    }
}
