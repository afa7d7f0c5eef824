use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// One-shot cancellation flag shared between the controller and the worker.
///
/// The controller is the only writer. `Release` on cancel paired with
/// `Acquire` on read makes the transition visible to the worker on its next check.
#[derive(Debug, Default)]
pub struct CancellationToken {
    canceled: AtomicBool,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Irreversibly marks the token as cancelled. Repeated calls are no-ops.
    pub fn cancel(&self) {
        if self.canceled.swap(true, Ordering::AcqRel) {
            debug!("Cancellation token already cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn starts_uncancelled_and_cancel_is_one_way() {
        let token = CancellationToken::new();
        assert!(!token.is_canceled());
        token.cancel();
        assert!(token.is_canceled());
        token.cancel();
        assert!(token.is_canceled());
    }

    #[test]
    fn cancel_is_visible_from_another_thread() {
        let token = Arc::new(CancellationToken::new());
        let reader = {
            let token = Arc::clone(&token);
            thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(5);
                while !token.is_canceled() {
                    assert!(Instant::now() < deadline, "cancellation never observed");
                    thread::yield_now();
                }
            })
        };
        token.cancel();
        reader.join().unwrap();
    }
}
