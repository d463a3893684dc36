use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-flight marker for a submit button.
///
/// Clones share the same flag, so a view can hold one while the flow that
/// owns the other is awaiting the backend.
#[derive(Debug, Clone, Default)]
pub struct Processing(Arc<AtomicBool>);

impl Processing {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped, including when
    /// the surrounding future is cancelled.
    pub fn start(&self) -> ProcessingGuard {
        self.0.store(true, Ordering::Release);
        ProcessingGuard(self.0.clone())
    }
}

#[must_use = "the flag is cleared as soon as the guard is dropped"]
pub struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
