use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Runs `action` whenever `next_delay` reports zero, sleeping otherwise, until cancelled.
///
/// `next_delay` is re-evaluated on every wake. Cancellation is checked at the top of
/// each iteration and interrupts a pending sleep, but an `action` already running is
/// allowed to finish first.
///
/// If `action` does not move `next_delay` off zero (a failed refresh, say), the loop
/// runs it again straight away with only a `yield_now` in between, so a persistent
/// failure turns into a busy retry loop.
pub async fn run_until_cancelled<D, A, Fut>(cancel: CancellationToken, mut next_delay: D, mut action: A)
where
    D: FnMut() -> Duration,
    A: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let delay = next_delay();
        if delay.is_zero() {
            action().await;
            tokio::task::yield_now().await;
            continue;
        }
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn runs_action_each_time_the_delay_elapses() {
        let cancel = CancellationToken::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let due = Arc::new(Mutex::new(Instant::now()));

        let handle = tokio::spawn({
            let cancel = cancel.clone();
            let runs = runs.clone();
            let due = due.clone();
            let due_for_delay = due.clone();
            run_until_cancelled(
                cancel,
                move || {
                    due_for_delay
                        .lock()
                        .unwrap()
                        .saturating_duration_since(Instant::now())
                },
                move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    *due.lock().unwrap() = Instant::now() + Duration::from_secs(60);
                    async {}
                },
            )
        });

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3, "runs at t=0, 60 and 120");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_a_long_sleep() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_until_cancelled(
            cancel.clone(),
            || Duration::from_secs(3600),
            || async {},
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let start = Instant::now();
        cancel.cancel();
        handle.await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_action_completes_before_stop() {
        let cancel = CancellationToken::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn({
            let cancel_inner = cancel.clone();
            let finished = finished.clone();
            run_until_cancelled(
                cancel.clone(),
                || Duration::ZERO,
                move || {
                    let cancel_inner = cancel_inner.clone();
                    let finished = finished.clone();
                    async move {
                        cancel_inner.cancel();
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                    }
                },
            )
        });

        handle.await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
