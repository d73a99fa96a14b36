use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Returned by [`CancellationSignal::check_in`] once a stop was requested.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("service stop requested")]
pub struct Cancelled;

/// One-shot stop flag shared by the control handler (writer) and the worker
/// loop (reader).
///
/// Once set it stays set for the rest of the process.
#[derive(Clone, Debug, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    /// Create an unset signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal. Setting it again has no effect.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// Whether the signal has been set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cooperative check-in for units of work.
    ///
    /// Long-running work calls this at least once per poll interval and
    /// returns early on `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] once the signal is set.
    pub fn check_in(&self) -> Result<(), Cancelled> {
        if self.is_set() { Err(Cancelled) } else { Ok(()) }
    }

    /// Resolves once the signal is set.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_sticky_and_idempotent() {
        let signal = CancellationSignal::new();
        let reader = signal.clone();

        assert!(!reader.is_set());
        assert_eq!(reader.check_in(), Ok(()));

        signal.set();
        signal.set();

        assert!(reader.is_set());
        assert_eq!(reader.check_in(), Err(Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_set() {
        let signal = CancellationSignal::new();
        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.cancelled().await }
        });

        signal.set();

        waiter.await.unwrap();
        assert!(signal.is_set());
    }
}
