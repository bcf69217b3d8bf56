//! Decode error taxonomy
//!
//! Only real decode failures live here. Cancellation is not an error - it is
//! a normal outcome of superseding or retiring work - and an evicted payload
//! is indistinguishable from one that was never computed.

use thiserror::Error;

/// Why a decode produced no bitmap.
///
/// Failures are terminal for their task: they are logged and latched at the
/// task boundary, never retried and never propagated across the async
/// boundary into the coordination thread.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The item's data is corrupt or in a format the decoder cannot handle.
    #[error("unsupported or corrupt media: {0}")]
    Unsupported(String),

    /// The decoder failed while producing the bitmap.
    #[error("decode failed: {0}")]
    Failed(String),
}
