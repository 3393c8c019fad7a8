use std::{future::Future, time::Duration};

///
/// Bounded retry with a delay doubling after every failed attempt
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_count: u32,
    pub initial_interval: Duration,
}

impl RetryPolicy {
    ///
    /// Delays slept between consecutive attempts.
    /// There is always at least one attempt, so `max_count` of 0 behaves like 1.
    ///
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let attempts = self.max_count.max(1);

        std::iter::successors(Some(self.initial_interval), |delay| delay.checked_mul(2))
            .take(attempts as usize - 1)
    }
}

///
/// Run async function until it returns Ok or the policy runs out of attempts.
///
/// ### Errors
/// Returns error of the last attempt
///
pub async fn retry_bounded<AttemptF, ErrF, F, Fut, T, E>(
    policy: RetryPolicy,
    attempt_log_fn: AttemptF,
    error_log_fn: ErrF,
    async_fn: F,
) -> Result<T, E>
where
    AttemptF: Fn(u32),
    ErrF: Fn(u32, &E),
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delays = policy.delays();
    let mut attempt = 0;

    loop {
        attempt += 1;

        attempt_log_fn(attempt);
        let err = match async_fn().await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };
        error_log_fn(attempt, &err);

        match delays.next() {
            Some(delay) => tokio::time::sleep(delay).await,
            None => return Err(err),
        }
    }
}
