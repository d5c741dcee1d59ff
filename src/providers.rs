//! Shared provider traits for dependency injection.
//!
//! External effects the core logic depends on are reached through small
//! traits, so tests can substitute deterministic implementations.

/// Source of the current Unix timestamp.
///
/// History entries record when a command ran; routing the clock through
/// this trait lets tests pin timestamps to known values.
///
/// # Example
///
/// ```
/// use famulus::providers::{TimeProvider, SystemTimeProvider};
///
/// let provider = SystemTimeProvider;
/// assert!(provider.now() > 0);
/// ```
pub trait TimeProvider: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// Production clock backed by the system time.
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
