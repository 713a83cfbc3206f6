use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Run `task` over `items` with at most `limit` tasks in flight.
///
/// Each result lands in the slot matching its input index, so the output
/// keeps input order whatever order the tasks finish in. A task that panics
/// leaves `None` in its slot and does not disturb the others.
pub async fn run_indexed<T, R, F, Fut>(items: Vec<T>, limit: usize, task: F) -> Vec<Option<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let fut = task(item);
        set.spawn(async move {
            // The semaphore is never closed, so acquiring cannot fail
            let _permit = permits.acquire_owned().await.ok();
            (index, fut.await)
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!(error = %e, "Worker task failed"),
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn results_follow_input_order() {
        let items = vec![30u64, 5, 20, 1];
        let results = run_indexed(items, 4, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay * 2
        })
        .await;

        assert_eq!(results, vec![Some(60), Some(10), Some(40), Some(2)]);
    }

    #[tokio::test]
    async fn never_exceeds_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = run_indexed((0..20).collect(), 3, |i: usize| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                i
            }
        })
        .await;

        assert_eq!(results.len(), 20);
        assert!(results.iter().all(Option::is_some));
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn panicking_task_only_empties_its_slot() {
        let results = run_indexed(vec![1, 2, 3], 2, |i: i32| async move {
            if i == 2 {
                panic!("boom");
            }
            i
        })
        .await;

        assert_eq!(results, vec![Some(1), None, Some(3)]);
    }

    #[tokio::test]
    async fn empty_input() {
        let results = run_indexed(Vec::<u8>::new(), 8, |i| async move { i }).await;
        assert!(results.is_empty());
    }
}
