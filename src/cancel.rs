//! Cooperative cancellation for long-running searches.

use crate::error::{CanopyError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag polled by a running search between units of work.
///
/// Clones share the same flag, so one clone can be handed to the search and
/// another kept by the caller.
///
/// # Examples
///
/// ```
/// use canopy::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once the token has fired.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CanopyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Poll an optional token.
#[inline]
pub(crate) fn check(token: Option<&CancelToken>) -> Result<()> {
    token.map_or(Ok(()), CancelToken::check)
}
