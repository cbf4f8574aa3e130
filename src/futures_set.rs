use std::{future::Future, num::NonZeroUsize};

use tokio::task::{JoinError, JoinSet};

/// Spawns every future and folds each output as it completes, keeping at
/// most `capacity` tasks in flight (all of them when `None`).
///
/// Never short-circuits: a task that panics or is cancelled is handed to
/// `fold_join_err` and the remaining tasks keep running. Returns once every
/// task has settled.
pub async fn join_all_settled<
    Iterable,
    Output,
    Accumulator,
    FoldWith,
    FoldJoinErr,
>(
    iterable: Iterable,
    capacity: Option<NonZeroUsize>,
    mut accumulator: Accumulator,
    mut fold_with: FoldWith,
    mut fold_join_err: FoldJoinErr,
) -> Accumulator
where
    Iterable: IntoIterator,
    Iterable::Item: Future<Output = Output> + Send + 'static,
    Output: Send + 'static,
    FoldWith: FnMut(Accumulator, Output) -> Accumulator,
    FoldJoinErr: FnMut(Accumulator, JoinError) -> Accumulator,
{
    let mut iter = iterable.into_iter().fuse();

    let mut set: JoinSet<Output> = match capacity {
        Some(capacity) => (&mut iter).take(capacity.get()).collect(),
        None => (&mut iter).collect(),
    };

    while let Some(result) = set.join_next().await {
        accumulator = match result {
            Ok(output) => fold_with(accumulator, output),
            Err(error) => fold_join_err(accumulator, error),
        };

        if let Some(future) = iter.next() {
            set.spawn(future);
        }
    }

    accumulator
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use super::*;

    async fn delayed_result(delay: Duration, value: u8) -> u8 {
        tokio::time::sleep(delay).await;
        value
    }

    async fn explode() -> u8 {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_join_set_folding() {
        let result = join_all_settled(
            [
                delayed_result(Duration::from_millis(350), 1),
                delayed_result(Duration::from_millis(150), 2),
                delayed_result(Duration::from_millis(50), 4),
                delayed_result(Duration::from_millis(250), 8),
                delayed_result(Duration::from_millis(450), 16),
            ],
            NonZeroUsize::new(3),
            0,
            |acc, result| acc ^ result,
            |acc, _| acc,
        )
        .await;

        assert_eq!(result, 31);
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_stop_siblings() {
        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = u8> + Send>>> = vec![
            Box::pin(delayed_result(Duration::from_millis(20), 1)),
            Box::pin(explode()),
            Box::pin(delayed_result(Duration::from_millis(40), 2)),
        ];

        let (sum, failed) = join_all_settled(
            tasks,
            None,
            (0, 0),
            |(sum, failed), value| (sum + value, failed),
            |(sum, failed), error| {
                assert!(error.is_panic());
                (sum, failed + 1)
            },
        )
        .await;

        assert_eq!(sum, 3);
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_capacity_bounds_in_flight_tasks() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let running = running.clone();
            let peak = peak.clone();
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        });

        let count =
            join_all_settled(tasks, NonZeroUsize::new(2), 0, |acc, _| acc + 1, |acc, _| acc)
                .await;

        assert_eq!(count, 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
