//! RAII ownership of native OS resources, plus the small helpers that usually
//! come with them: stack-then-heap buffers for size-probing calls, a bounded
//! ring buffer, streaming codecs and secret storage.

pub mod codec;
pub mod dplhandle;
pub mod error;
pub mod format;
pub mod growing_buffer;
pub mod guid;
pub mod handle;
pub mod lazy_symbol;
pub mod platform;
pub mod sanitizing;
pub mod vector_queue;

pub use self::dplhandle::DuplicableResource;
pub use self::error::{Error, Result, StatusError};
pub use self::growing_buffer::{CallError, GrowError, GrowingCall, STACK_BUFFER_BYTES};
pub use self::handle::{Handle, Resource};
pub use self::lazy_symbol::LazySymbol;
pub use self::sanitizing::{SanitizingBlob, SanitizingVec};
pub use self::vector_queue::VectorQueue;
