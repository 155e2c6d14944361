#![cfg(windows)]

use std::os::windows::ffi::OsStringExt;

use handle_kit::{
    Handle, Resource,
    growing_buffer::{CallError, GrowError, GrowingCall, bytes_to_elements, elements_to_bytes, trim_nul},
};
use windows::{
    Win32::{
        Foundation::ERROR_MORE_DATA,
        System::Registry::{
            HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, REG_ROUTINE_FLAGS, REG_SAM_FLAGS,
            REG_VALUE_TYPE, RRF_RT_REG_BINARY, RRF_RT_REG_SZ, RegCloseKey, RegGetValueW,
            RegOpenKeyExW,
        },
    },
    core::PCWSTR,
};

pub struct PredefinedKey(HKEY);
impl PredefinedKey {
    pub const LOCAL_MACHINE: Self = Self(HKEY_LOCAL_MACHINE);
    pub const CURRENT_USER: Self = Self(HKEY_CURRENT_USER);
}
impl RegistryKey for PredefinedKey {
    #[inline(always)]
    fn as_hkey(&self) -> HKEY {
        self.0
    }
}

/// Opened registry key, closed with `RegCloseKey`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Key;
impl Resource for Key {
    type Raw = HKEY;
    const INVALID: HKEY = HKEY(core::ptr::null_mut());

    fn release(&self, raw: HKEY) {
        if let Err(e) = unsafe { RegCloseKey(raw).ok() } {
            tracing::warn!(reason = ?e, "RegCloseKey failed");
        }
    }
}

pub type OwnedKey = Handle<Key>;
impl RegistryKey for OwnedKey {
    #[inline(always)]
    fn as_hkey(&self) -> HKEY {
        self.raw()
    }
}

fn more_data() -> windows::core::Error {
    ERROR_MORE_DATA.to_hresult().into()
}

pub trait RegistryKey {
    fn as_hkey(&self) -> HKEY;

    #[inline]
    fn open(
        &self,
        subkey: Option<PCWSTR>,
        options: u32,
        sam_desired: REG_SAM_FLAGS,
    ) -> windows::core::Result<OwnedKey> {
        let mut key = OwnedKey::new();
        unsafe {
            RegOpenKeyExW(
                self.as_hkey(),
                subkey.unwrap_or(const { PCWSTR::null() }),
                Some(options),
                sam_desired,
                key.as_out_ptr(),
            )
            .ok()?;
        }

        Ok(key)
    }

    /// # Safety
    /// `data_out` must be valid for writes of `*data_length_inout` bytes.
    #[inline]
    unsafe fn get_value<T>(
        &self,
        subkey: Option<PCWSTR>,
        value: Option<PCWSTR>,
        flags: REG_ROUTINE_FLAGS,
        type_out: *mut REG_VALUE_TYPE,
        data_out: *mut T,
        data_length_inout: *mut u32,
    ) -> windows::core::Result<()> {
        unsafe {
            RegGetValueW(
                self.as_hkey(),
                subkey.unwrap_or(const { PCWSTR::null() }),
                value.unwrap_or(const { PCWSTR::null() }),
                flags,
                Some(type_out),
                Some(data_out as _),
                Some(data_length_inout),
            )
            .ok()
        }
    }

    /// Reads a `REG_SZ` value (expanding `REG_EXPAND_SZ` is left to the caller).
    fn get_sz_value(
        &self,
        subkey: Option<PCWSTR>,
        value: Option<PCWSTR>,
    ) -> windows::core::Result<std::ffi::OsString> {
        let chars = GrowingCall::new().call(|buf: &mut [u16]| {
            let mut len_bytes = elements_to_bytes::<u16>(buf.len()) as u32;
            match unsafe {
                self.get_value(
                    subkey,
                    value,
                    RRF_RT_REG_SZ,
                    core::ptr::null_mut(),
                    buf.as_mut_ptr(),
                    &mut len_bytes,
                )
            } {
                Ok(()) => Ok(bytes_to_elements::<u16>(len_bytes as _)),
                Err(e) if e.code() == ERROR_MORE_DATA.to_hresult() => Err(CallError::MoreData {
                    required: Some(bytes_to_elements::<u16>(len_bytes as _)),
                }),
                Err(e) => Err(CallError::Failed(e)),
            }
        });

        match chars {
            // OsString does not need the terminator
            Ok(v) => Ok(std::ffi::OsString::from_wide(&trim_nul(v))),
            Err(GrowError::Call(e)) => Err(e),
            Err(GrowError::LimitExceeded { .. }) => Err(more_data()),
        }
    }

    /// Reads a `REG_BINARY` value. Embedded zero bytes are kept.
    fn get_binary_value(
        &self,
        subkey: Option<PCWSTR>,
        value: Option<PCWSTR>,
    ) -> windows::core::Result<Vec<u8>> {
        let bytes = GrowingCall::new().call(|buf: &mut [u8]| {
            let mut len = buf.len() as u32;
            match unsafe {
                self.get_value(
                    subkey,
                    value,
                    RRF_RT_REG_BINARY,
                    core::ptr::null_mut(),
                    buf.as_mut_ptr(),
                    &mut len,
                )
            } {
                Ok(()) => Ok(len as usize),
                Err(e) if e.code() == ERROR_MORE_DATA.to_hresult() => Err(CallError::MoreData {
                    required: Some(len as usize),
                }),
                Err(e) => Err(CallError::Failed(e)),
            }
        });

        match bytes {
            Ok(v) => Ok(v),
            Err(GrowError::Call(e)) => Err(e),
            Err(GrowError::LimitExceeded { .. }) => Err(more_data()),
        }
    }
}
