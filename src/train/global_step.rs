use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide monotonic counter of completed optimization steps.
///
/// The sole source of truth for training progress: initialized from the
/// restored checkpoint (or 0), incremented exactly once per optimization
/// step by the trainer, read by the decay schedule and the hook cadence,
/// and persisted on exit. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct GlobalStep(Arc<AtomicU64>);

impl GlobalStep {
    pub fn new() -> GlobalStep {
        GlobalStep::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Advances by one; returns the new value.
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Resets to a restored value. Only the restore path calls this.
    pub fn set(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_counter() {
        let step = GlobalStep::new();
        let alias = step.clone();
        assert_eq!(step.increment(), 1);
        assert_eq!(alias.get(), 1);
        alias.set(41);
        assert_eq!(step.increment(), 42);
    }
}
