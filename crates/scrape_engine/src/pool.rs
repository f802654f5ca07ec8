use std::future::Future;

use futures_util::stream::{self, StreamExt};
use tokio::task::JoinError;

/// Runs `f` over `items` on the tokio runtime with at most `concurrency`
/// tasks in flight, returning outputs in input order.
///
/// Each item is spawned as its own task, so work runs on the runtime's
/// worker threads in parallel. Completions are written into a slot indexed
/// by submission position; a task that panics yields its `JoinError` in
/// that slot instead of aborting the others.
pub async fn map_ordered<T, R, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    f: F,
) -> Vec<Result<R, JoinError>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let mut slots: Vec<Option<Result<R, JoinError>>> = Vec::with_capacity(items.len());
    slots.resize_with(items.len(), || None);

    let mut completions = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let handle = tokio::spawn(f(item));
            async move { (index, handle.await) }
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((index, outcome)) = completions.next().await {
        slots[index] = Some(outcome);
    }

    slots.into_iter().flatten().collect()
}
