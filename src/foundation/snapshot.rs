use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Latest-value cell shared between one writer thread and any number of readers.
///
/// Readers get the most recently published value without blocking the writer; older values
/// are dropped once the last reader lets go of them.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    inner: Arc<ArcSwapOption<T>>,
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotCell<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::empty()),
        }
    }

    pub fn publish(&self, value: T) {
        self.inner.store(Some(Arc::new(value)));
    }

    pub fn latest(&self) -> Option<Arc<T>> {
        self.inner.load_full()
    }

    pub fn clear(&self) {
        self.inner.store(None);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/snapshot.rs"]
mod tests;
