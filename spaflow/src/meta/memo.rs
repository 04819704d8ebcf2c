//! Compute-once cells.

use std::fmt;
use std::sync::OnceLock;

/// A value computed on first access and cached afterwards.
pub struct Memo<T> {
    cell: OnceLock<T>,
    init: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> Memo<T> {
    /// Creates a memo computing its value with `init`.
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            init: Box::new(init),
        }
    }

    /// Returns the value, computing it on first call.
    pub fn get(&self) -> &T {
        self.cell.get_or_init(|| (self.init)())
    }

    /// Returns true once the value has been computed.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: Default + 'static> Default for Memo<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Memo").field(value).finish(),
            None => f.write_str("Memo(<pending>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_computes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let memo = Memo::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert!(!memo.is_computed());
        assert_eq!(*memo.get(), 42);
        assert_eq!(*memo.get(), 42);
        assert!(memo.is_computed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_output() {
        let memo: Memo<Option<u8>> = Memo::default();
        assert_eq!(format!("{memo:?}"), "Memo(<pending>)");
        memo.get();
        assert_eq!(format!("{memo:?}"), "Memo(None)");
    }
}
