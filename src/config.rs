use std::time::Duration;

/// How long a locking read waits for a contended row when nothing else is configured.
pub const DEFAULT_LOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables shared by every [`ProductStore`](crate::domain::ports::ProductStore) backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on waiting for another transaction's row lock. `None` waits
    /// forever, which lets two purchases that lock the same SKUs in opposite
    /// order block each other indefinitely.
    pub lock_wait_timeout: Option<Duration>,
}

impl StoreConfig {
    /// Builds a config from a millisecond count where `0` disables the timeout.
    pub fn from_lock_timeout_ms(ms: u64) -> Self {
        Self {
            lock_wait_timeout: (ms > 0).then(|| Duration::from_millis(ms)),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_wait_timeout: Some(DEFAULT_LOCK_WAIT_TIMEOUT),
        }
    }
}
