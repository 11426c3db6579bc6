//! Settle-all join for independent fallible futures.

use futures::future::join_all;
use std::future::Future;

/// Drive every future to completion and return their outcomes in input order.
///
/// Unlike `try_join_all`, a failure never short-circuits the join: siblings
/// keep running until each one has either succeeded or failed. The returned
/// vector lines up positionally with the input, regardless of which future
/// finished first.
pub async fn settle_all<I, F, T, E>(futures: I) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    async fn after(ms: u64, outcome: Result<u64, String>) -> Result<u64, String> {
        sleep(Duration::from_millis(ms)).await;
        outcome
    }

    #[tokio::test(start_paused = true)]
    async fn test_preserves_input_order() {
        let outcomes = settle_all([
            after(300, Ok(1)),
            after(100, Ok(2)),
            after(200, Ok(3)),
        ])
        .await;

        assert_eq!(outcomes, vec![Ok(1), Ok(2), Ok(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_cancel_siblings() {
        let start = Instant::now();

        let outcomes = settle_all([
            after(100, Err("early".to_string())),
            after(500, Ok(2)),
        ])
        .await;

        assert_eq!(outcomes, vec![Err("early".to_string()), Ok(2)]);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_concurrently() {
        let start = Instant::now();

        let outcomes = settle_all((0..5).map(|i| after(1000, Ok(i)))).await;

        assert_eq!(outcomes.len(), 5);
        assert!(start.elapsed() < Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let outcomes: Vec<Result<u64, String>> =
            settle_all(Vec::<std::future::Ready<Result<u64, String>>>::new()).await;
        assert!(outcomes.is_empty());
    }
}
