//! Cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{DenoiseError, Result};

/// Shared flag polled between frames; cloning shares the same flag
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once [`CancelFlag::cancel`] has been called
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DenoiseError::Cancelled)
        } else {
            Ok(())
        }
    }
}
