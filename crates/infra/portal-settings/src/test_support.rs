//! Helpers for tests that mutate the process environment.

/// Restores an environment variable to its original value when dropped.
///
/// Tests using it must be marked `#[serial(env)]`.
pub struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    /// Sets `key` to `value` for the guard's lifetime.
    #[must_use]
    pub fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        // SAFETY: callers serialize environment access with `#[serial(env)]`.
        unsafe { std::env::set_var(key, value) };
        Self { key, original }
    }

    /// Unsets `key` for the guard's lifetime.
    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        let original = std::env::var(key).ok();
        // SAFETY: callers serialize environment access with `#[serial(env)]`.
        unsafe { std::env::remove_var(key) };
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: the guard is dropped inside the same serialized test.
        unsafe {
            match &self.original {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }
}
