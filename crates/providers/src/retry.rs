//! Retry with exponential backoff around a single provider.
//!
//! Each attempt is bounded by a timeout. Only [`ProviderError::is_retryable`]
//! failures (timeouts and rate limits) are retried; anything else is returned
//! after the first attempt.

use async_trait::async_trait;
use draftpress_config::GenerationConfig;
use draftpress_core::{GenerationRequest, Provider, ProviderError};
use std::time::Duration;
use tracing::{info, warn};

/// How many times to call a provider and how long to wait between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Always at least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Upper bound on a single attempt.
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            call_timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Delay after the `attempt`-th failure (1-based): `initial * 2^(attempt-1)`,
    /// raised to a rate-limit hint when one was given, capped at `max_backoff`.
    pub fn backoff_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let mut delay = self.initial_backoff.saturating_mul(1u32 << exponent);

        if let ProviderError::RateLimited {
            retry_after_secs: Some(secs),
        } = error
        {
            delay = delay.max(Duration::from_secs(*secs));
        }

        delay.min(self.max_backoff)
    }
}

/// A provider that retries its inner provider according to a [`RetryPolicy`].
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: Provider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: Provider> Provider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        generate_with_retry(&self.inner, request, &self.policy).await
    }
}

/// Call `provider` until it succeeds, fails permanently, or attempts run out.
pub async fn generate_with_retry<P>(
    provider: &P,
    request: &GenerationRequest,
    policy: &RetryPolicy,
) -> Result<String, ProviderError>
where
    P: Provider + ?Sized,
{
    let name = provider.name().to_string();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        info!(provider = %name, attempt, max_attempts, "Calling provider");

        let error = match tokio::time::timeout(policy.call_timeout, provider.generate(request)).await {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => e,
            Err(_) => ProviderError::Timeout(format!(
                "Provider '{}' did not respond within {}s",
                name,
                policy.call_timeout.as_secs()
            )),
        };

        if !error.is_retryable() {
            warn!(provider = %name, attempt, error = %error, "Provider failed permanently");
            return Err(error);
        }
        if attempt >= max_attempts {
            warn!(provider = %name, attempt, error = %error, "Provider retries exhausted");
            return Err(error);
        }

        let delay = policy.backoff_for(attempt, &error);
        warn!(
            provider = %name,
            attempt,
            error = %error,
            backoff_ms = delay.as_millis() as u64,
            "Provider failed, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A mock provider that replays scripted outcomes in order.
    struct ScriptedProvider {
        outcomes: Mutex<Vec<Result<String, ProviderError>>>,
        call_count: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(mut outcomes: Vec<Result<String, ProviderError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .expect("ScriptedProvider exhausted")
        }
    }

    /// A mock provider that hangs forever (for timeout testing).
    struct HangingProvider {
        call_count: Mutex<usize>,
    }

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            call_timeout: Duration::from_secs(10),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("system", "prompt")
    }

    fn timeout() -> ProviderError {
        ProviderError::Timeout("slow".into())
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_two_timeouts() {
        let provider = ScriptedProvider::new(vec![Err(timeout()), Err(timeout()), Ok("done".into())]);
        let started = tokio::time::Instant::now();

        let result = generate_with_retry(&provider, &request(), &policy()).await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(provider.calls(), 3);
        // 1s after the first failure, 2s after the second.
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_is_not_retried() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::AuthFailure("bad key".into())),
            Ok("never".into()),
        ]);

        let result = generate_with_retry(&provider, &request(), &policy()).await;

        assert!(matches!(result, Err(ProviderError::AuthFailure(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_response_is_not_retried() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::MalformedResponse("no text".into())),
            Ok("never".into()),
        ]);

        let result = generate_with_retry(&provider, &request(), &policy()).await;

        assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhausts_attempts() {
        let limited = || ProviderError::RateLimited {
            retry_after_secs: None,
        };
        let provider = ScriptedProvider::new(vec![Err(limited()), Err(limited()), Err(limited())]);

        let result = generate_with_retry(&provider, &request(), &policy()).await;

        assert!(matches!(result, Err(ProviderError::RateLimited { .. })));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_provider_times_out_each_attempt() {
        let provider = HangingProvider {
            call_count: Mutex::new(0),
        };

        let result = generate_with_retry(&provider, &request(), &policy()).await;

        match result {
            Err(ProviderError::Timeout(msg)) => assert!(msg.contains("10s")),
            other => panic!("Expected Timeout, got: {other:?}"),
        }
        assert_eq!(*provider.call_count.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retrying_provider_wraps_inner() {
        let provider = RetryingProvider::new(
            ScriptedProvider::new(vec![Err(timeout()), Ok("wrapped".into())]),
            policy(),
        );

        assert_eq!(provider.name(), "scripted");
        assert_eq!(provider.generate(&request()).await.unwrap(), "wrapped");
        assert_eq!(provider.inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_does_not_retry() {
        let provider = ScriptedProvider::new(vec![Err(timeout()), Ok("never".into())]);
        let single = RetryPolicy {
            max_attempts: 1,
            ..policy()
        };

        assert!(generate_with_retry(&provider, &request(), &single).await.is_err());
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy();
        let err = timeout();
        assert_eq!(p.backoff_for(1, &err), Duration::from_secs(1));
        assert_eq!(p.backoff_for(2, &err), Duration::from_secs(2));
        assert_eq!(p.backoff_for(3, &err), Duration::from_secs(4));
        assert_eq!(p.backoff_for(10, &err), Duration::from_secs(30));
        assert_eq!(p.backoff_for(200, &err), Duration::from_secs(30));
    }

    #[test]
    fn rate_limit_hint_raises_backoff() {
        let p = policy();
        let hinted = ProviderError::RateLimited {
            retry_after_secs: Some(12),
        };
        assert_eq!(p.backoff_for(1, &hinted), Duration::from_secs(12));

        let huge = ProviderError::RateLimited {
            retry_after_secs: Some(3600),
        };
        assert_eq!(p.backoff_for(1, &huge), Duration::from_secs(30));
    }

    #[test]
    fn policy_from_config() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.call_timeout, Duration::from_secs(90));
        assert_eq!(p.initial_backoff, Duration::from_millis(1000));
    }
}
