use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Admits at most one refresh at a time.
///
/// A second caller is turned away rather than queued; the gate reopens when
/// the active [`RefreshGuard`] is dropped, including on early return or panic.
#[derive(Debug, Clone, Default)]
pub struct RefreshGate {
    busy: Arc<AtomicBool>,
}

#[derive(Debug)]
#[must_use = "the gate reopens as soon as the guard is dropped"]
pub struct RefreshGuard {
    busy: Arc<AtomicBool>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<RefreshGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
