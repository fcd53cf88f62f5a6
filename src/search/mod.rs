//! Street-graph search: the bounded expansion primitive and the
//! stop-reachability search built on top of it.

pub mod bounded;
pub mod reachability;

pub use bounded::{SearchSpace, VisitId, VisitRecord, bounded_search};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation signal shared across one request.
///
/// Checked between vertex settlements and periodically inside the connection
/// scan; a cancelled token surfaces as [`crate::Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
