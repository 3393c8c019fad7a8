use std::{future::Future, time::Duration};

///
/// Run async function in a loop until it returns Ok.
/// Attempts are separated by a fixed `retry_interval`.
///
pub async fn retry<AttemptF, ErrF, F, Fut, T, E>(
    retry_interval: Duration,
    attempt_log_fn: AttemptF,
    error_log_fn: ErrF,
    async_fn: F,
) -> T
where
    AttemptF: Fn(u32),
    ErrF: Fn(u32, E),
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        attempt_log_fn(attempt);
        match async_fn().await {
            Ok(output) => return output,
            Err(err) => error_log_fn(attempt, err),
        }

        tokio::time::sleep(retry_interval).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    };
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn retry_returns_first_ok() {
        let calls = AtomicU32::new(0);

        let output = retry(
            Duration::from_secs(5),
            |_| (),
            |_, _: &'static str| (),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &'static str>(42)
            },
        )
        .await;

        assert_eq!(output, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_waits_interval_between_attempts() {
        let retry_interval = Duration::from_secs(5);
        let calls = AtomicU32::new(0);
        let begin = Instant::now();

        let output = retry(
            retry_interval,
            |_| (),
            |_, _: &'static str| (),
            || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0..=2 => Err("broker unreachable"),
                    _ => Ok("connected"),
                }
            },
        )
        .await;

        assert_eq!(output, "connected");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(Instant::now() >= begin + retry_interval * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_reports_every_failed_attempt() {
        let failed_attempts = Mutex::new(Vec::new());
        let calls = AtomicU32::new(0);

        retry(
            Duration::from_millis(10),
            |_| (),
            |attempt, _: &'static str| failed_attempts.lock().unwrap().push(attempt),
            || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err("nope"),
                    _ => Ok(()),
                }
            },
        )
        .await;

        assert_eq!(*failed_attempts.lock().unwrap(), vec![1, 2]);
    }
}
