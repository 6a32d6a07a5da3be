//! Request-scoped context passed to every lifecycle call
//!
//! A Context identifies one host request so that log lines emitted while
//! serving it can be correlated, and records when the request started.

use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Context carries request-scoped values across async boundaries
/// Pass this as first parameter to all async trait methods
#[derive(Clone, Debug)]
pub struct Context {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    request_id: Uuid,
    started: Instant,
}

impl Context {
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                request_id,
                started: Instant::now(),
            }),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    /// Time since the host issued this request
    pub fn elapsed(&self) -> Duration {
        self.inner.started.elapsed()
    }

    /// Span to attach to work done on behalf of this request
    pub fn span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!("tf_request", request_id = %self.inner.request_id, operation)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_get_distinct_request_ids() {
        let a = Context::new();
        let b = Context::new();
        assert_ne!(a.request_id(), b.request_id());
    }

    #[test]
    fn cloned_context_shares_request_id() {
        let ctx = Context::new();
        let cloned = ctx.clone();
        assert_eq!(ctx.request_id(), cloned.request_id());
    }

    #[test]
    fn explicit_request_id_is_kept() {
        let id = Uuid::new_v4();
        let ctx = Context::with_request_id(id);
        assert_eq!(ctx.request_id(), id);
        assert!(ctx.elapsed() < Duration::from_secs(60));
    }
}
