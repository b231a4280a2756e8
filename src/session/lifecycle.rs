//! Lifecycle scope supplied by the hosting UI.

use tokio_util::sync::CancellationToken;

/// How long the camera should stay active.
///
/// The scope starts when created and ends on [`end`](Self::end). Clones
/// share the same underlying signal; child scopes end with their parent.
#[derive(Debug, Clone, Default)]
pub struct LifecycleScope {
    token: CancellationToken,
}

impl LifecycleScope {
    /// Creates a scope that has started and not yet ended.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope that ends when this one does, or earlier.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Signals the end of the scope. Idempotent.
    pub fn end(&self) {
        self.token.cancel();
    }

    /// Returns true once [`end`](Self::end) has been called.
    pub fn is_ended(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the scope has ended.
    pub async fn ended(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_end_wakes_waiters() {
        let scope = LifecycleScope::new();
        let waiter = scope.clone();

        let handle = tokio::spawn(async move { waiter.ended().await });
        scope.end();
        handle.await.unwrap();

        assert!(scope.is_ended());
    }

    #[test]
    fn test_child_ends_with_parent() {
        let parent = LifecycleScope::new();
        let child = parent.child();

        child.end();
        assert!(!parent.is_ended());

        let other = parent.child();
        parent.end();
        assert!(other.is_ended());
    }
}
