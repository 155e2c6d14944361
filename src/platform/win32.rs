//! Win32 kernel objects and loaded modules.

use crate::dplhandle::DuplicableResource;
use crate::error::StatusError;
use crate::growing_buffer::{CallError, GrowError, call_growing};
use crate::handle::{Handle, Resource};
use crate::lazy_symbol::LazySymbol;
use windows::{
    Win32::{
        Foundation::{
            CloseHandle, DUPLICATE_SAME_ACCESS, DuplicateHandle, ERROR_CALL_NOT_IMPLEMENTED,
            ERROR_INSUFFICIENT_BUFFER, FreeLibrary, HANDLE, HMODULE,
        },
        Security::SECURITY_ATTRIBUTES,
        System::{
            LibraryLoader::LoadLibraryW,
            Threading::{CreateEventW, GetCurrentProcess, ResetEvent, SetEvent},
        },
    },
    core::{GUID, PCWSTR},
};

/// Kernel object handle closed with `CloseHandle`.
///
/// Most creation APIs report failure as a null handle; file APIs use
/// `INVALID_HANDLE_VALUE` (-1). `SENTINEL` selects which one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelHandle<const SENTINEL: isize = 0>;
impl<const SENTINEL: isize> Resource for KernelHandle<SENTINEL> {
    type Raw = HANDLE;
    const INVALID: HANDLE = HANDLE(SENTINEL as _);

    fn release(&self, raw: HANDLE) {
        if let Err(e) = unsafe { CloseHandle(raw) } {
            tracing::warn!(reason = ?e, "closing handle failed");
        }
    }
}
impl<const SENTINEL: isize> DuplicableResource for KernelHandle<SENTINEL> {
    fn duplicate(&self, raw: HANDLE) -> HANDLE {
        let process = unsafe { GetCurrentProcess() };
        let mut dup = HANDLE::default();
        match unsafe { DuplicateHandle(process, raw, process, &mut dup, 0, false, DUPLICATE_SAME_ACCESS) } {
            Ok(()) => dup,
            Err(e) => {
                tracing::warn!(reason = ?e, "duplicating handle failed");
                Self::INVALID
            }
        }
    }
}

pub type OwnedHandle = Handle<KernelHandle>;
pub type OwnedFileHandle = Handle<KernelHandle<-1>>;

/// Loaded DLL released with `FreeLibrary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Module;
impl Resource for Module {
    type Raw = HMODULE;
    const INVALID: HMODULE = HMODULE(core::ptr::null_mut());

    fn release(&self, raw: HMODULE) {
        if let Err(e) = unsafe { FreeLibrary(raw) } {
            tracing::warn!(reason = ?e, "freeing library failed");
        }
    }
}

pub type OwnedModule = Handle<Module>;

pub fn load_library(name: PCWSTR) -> windows::core::Result<OwnedModule> {
    let m = unsafe { LoadLibraryW(name)? };

    Ok(unsafe { OwnedModule::from_raw(m) })
}

/// Manual or auto reset event.
#[derive(Clone)]
pub struct EventObject(OwnedHandle);
unsafe impl Sync for EventObject {}
unsafe impl Send for EventObject {}
impl EventObject {
    #[inline(always)]
    pub fn new(
        security_attributes: Option<*const SECURITY_ATTRIBUTES>,
        manual_reset: bool,
        initial_state: bool,
    ) -> windows::core::Result<Self> {
        let h = unsafe { CreateEventW(security_attributes, manual_reset, initial_state, None)? };

        Ok(Self(unsafe { OwnedHandle::from_raw(h) }))
    }

    pub const fn handle(&self) -> HANDLE {
        self.0.raw()
    }

    #[inline(always)]
    pub fn set(&self) -> windows::core::Result<()> {
        unsafe { SetEvent(self.0.raw()) }
    }

    #[inline(always)]
    pub fn reset(&self) -> windows::core::Result<()> {
        unsafe { ResetEvent(self.0.raw()) }
    }
}

/// Braced uppercase form of a Win32 `GUID`.
pub fn guid_string(g: &GUID) -> String {
    crate::guid::guid_string(g.data1, g.data2, g.data3, g.data4)
}

type WlanReasonCodeToStringFn =
    unsafe extern "system" fn(u32, u32, *mut u16, *mut core::ffi::c_void) -> u32;

// wlanapi.dll is missing on server SKUs without the wireless feature
static WLAN_REASON_CODE_TO_STRING: LazySymbol<WlanReasonCodeToStringFn> =
    unsafe { LazySymbol::new("wlanapi.dll", "WlanReasonCodeToString") };

/// Describes a WLAN reason code.
///
/// Fails with `ERROR_CALL_NOT_IMPLEMENTED` when the WLAN API is not installed.
pub fn wlan_reason_code_to_string(code: u32) -> Result<String, StatusError<u32>> {
    let f = WLAN_REASON_CODE_TO_STRING
        .get()
        .map_err(|e| StatusError::new(ERROR_CALL_NOT_IMPLEMENTED.0, e.to_string()))?;

    describe_growing(|buf| unsafe {
        f(code, buf.len() as _, buf.as_mut_ptr(), core::ptr::null_mut())
    })
}

/// Runs a describe-style call that reports only a status code and silently
/// truncates, growing the buffer until the text comes back terminated.
fn describe_growing(
    mut f: impl FnMut(&mut [u16]) -> u32,
) -> Result<String, StatusError<u32>> {
    // success with no terminator inside the buffer means the text was cut
    let r = call_growing::<u16, u32, _>(|buf| match f(buf) {
        0 => match buf.iter().position(|&c| c == 0) {
            Some(n) => Ok(n),
            None => Err(CallError::MoreData { required: None }),
        },
        e => Err(CallError::Failed(e)),
    });
    match r {
        Ok(v) => Ok(String::from_utf16_lossy(&v)),
        Err(GrowError::Call(e)) => Err(StatusError::new(e, "WlanReasonCodeToString failed")),
        Err(e @ GrowError::LimitExceeded { .. }) => {
            Err(StatusError::new(ERROR_INSUFFICIENT_BUFFER.0, e.to_string()))
        }
    }
}
