//! Progress reporting and cooperative cancellation (C11) for the batch
//! operations in [`crate::boat_fit`] and [`crate::water_fill`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// `0.0..=1.0` fraction-complete callback, fired once per unit of work named
/// by the calling component (an X-strip for boat-fit, a plane for
/// flood-fill).
pub type Progress<'a> = dyn Fn(f64) + Sync + 'a;

pub fn no_progress(_fraction: f64) {}

/// A cheaply cloned flag shared between a batch operation's caller and its
/// workers. Checked at the granularity named by each component; once set,
/// workers abandon their partial work and the operation returns
/// `Err(Error::Cancelled)`.
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
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
