use backon::ExponentialBuilder;
use reqwest::Method;
use std::time::Duration;

/// Default exponential backoff for idempotent web API requests
///
/// 300ms doubling up to 3s, at most 3 retries, with jitter.
#[must_use]
pub fn default_backoff_builder() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(300))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(3)
        .with_factor(2.0)
        .with_jitter()
}

/// Gateway failures worth another attempt.
#[must_use]
pub const fn is_retryable_status(code: u16) -> bool {
    matches!(code, 502..=504)
}

/// Methods that may be sent twice without changing the outcome.
#[must_use]
pub fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::PUT | Method::DELETE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_matrix() {
        assert!(is_retryable_status(502));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(504));
        assert!(!is_retryable_status(500));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(429));
        assert!(!is_retryable_status(200));
    }

    #[test]
    fn only_idempotent_methods_retry() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::PUT));
        assert!(is_idempotent(&Method::DELETE));
        assert!(!is_idempotent(&Method::POST));
        assert!(!is_idempotent(&Method::PATCH));
    }
}
