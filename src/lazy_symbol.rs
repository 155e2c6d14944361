//! Optional functions resolved from shared libraries on first use.

use crate::error::{Error, Result};
use std::sync::OnceLock;

/// A function that may or may not exist on the running system.
///
/// The library is opened and the symbol looked up once, the first time
/// [`LazySymbol::get`] runs. Both success and failure are cached. A resolved
/// library stays loaded for the lifetime of the symbol, which for the usual
/// `static` declaration is the whole process.
///
/// ```ignore
/// static STRLEN: LazySymbol<unsafe extern "C" fn(*const c_char) -> usize> =
///     unsafe { LazySymbol::new("libc.so.6", "strlen") };
/// ```
pub struct LazySymbol<F: Copy + 'static> {
    library: &'static str,
    symbol: &'static str,
    resolved: OnceLock<Option<(libloading::Library, F)>>,
}
impl<F: Copy + 'static> LazySymbol<F> {
    /// # Safety
    /// `F` must be the exact function pointer type of `symbol`.
    pub const unsafe fn new(library: &'static str, symbol: &'static str) -> Self {
        Self {
            library,
            symbol,
            resolved: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Result<F> {
        match self.resolved.get_or_init(|| self.resolve()) {
            Some((_, f)) => Ok(*f),
            None => Err(Error::FeatureUnavailable(format!(
                "{}!{}",
                self.library, self.symbol
            ))),
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.get().is_ok()
    }

    fn resolve(&self) -> Option<(libloading::Library, F)> {
        let library = unsafe { libloading::Library::new(self.library) }.ok()?;
        let f: F = *unsafe { library.get::<F>(self.symbol.as_bytes()) }.ok()?;

        Some((library, f))
    }
}
impl<F: Copy + 'static> core::fmt::Debug for LazySymbol<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazySymbol")
            .field("library", &self.library)
            .field("symbol", &self.symbol)
            .field(
                "resolved",
                &self.resolved.get().map(|r| r.is_some()),
            )
            .finish()
    }
}
