use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{RenderError, RenderResult};

/// Cooperative cancellation signal shared between a caller and the
/// disassembler it drives. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(RenderError::Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> RenderResult {
        if self.is_cancelled() {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Per-call rendering configuration. Created by the caller and only borrowed
/// by a language for the duration of one call.
#[derive(Debug, Clone, Default)]
pub struct DecompilationOptions {
    /// Emit full bodies, references and module contents instead of headers only.
    pub full_decompilation: bool,
    pub cancellation: CancellationToken,
}

impl DecompilationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            full_decompilation: true,
            ..Self::default()
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}
