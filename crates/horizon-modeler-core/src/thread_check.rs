//! Thread affinity checks for the model.
//!
//! A [`Model`](crate::Model) is shared through `Arc`, but every mutation and
//! every change notification runs on the thread that created it. Keeping a
//! single mutation in flight is what lets watcher callbacks run
//! synchronously before the mutating call returns.
//!
//! ```ignore
//! use horizon_modeler_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! affinity.check()?; // Err(ModelError::WrongThread) on any other thread
//! ```

use std::thread::ThreadId;

use crate::error::{ModelError, ModelResult};

/// Records the thread an object belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Fail with [`ModelError::WrongThread`] when called from another thread.
    pub fn check(&self) -> ModelResult<()> {
        if self.is_same_thread() {
            Ok(())
        } else {
            tracing::warn!(
                target: crate::logging::targets::THREAD,
                expected = ?self.thread_id,
                actual = ?std::thread::current().id(),
                "model accessed from foreign thread"
            );
            Err(ModelError::WrongThread)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_current_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        assert!(affinity.check().is_ok());
    }

    #[test]
    fn test_affinity_other_thread() {
        let affinity = ThreadAffinity::current();
        let result = std::thread::spawn(move || affinity.check())
            .join()
            .unwrap();
        assert_eq!(result, Err(ModelError::WrongThread));
    }
}
