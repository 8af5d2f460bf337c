// Deadline-bounded join over concurrent fetches
use crate::application::measurement_client::FetchError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// How one fetch of a fan-out ended.
#[derive(Debug)]
pub enum Settlement<T> {
    Delivered(T),
    Failed(FetchError),
    TimedOut,
}

impl<T> Settlement<T> {
    pub fn delivered(self) -> Option<T> {
        match self {
            Settlement::Delivered(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Settlement::Delivered(_))
    }
}

/// Drive every fetch concurrently on the current task and collect the
/// outcomes in submission order.
///
/// The join closes when every fetch has settled or when `deadline` elapses,
/// whichever comes first. Fetches still pending at the deadline are dropped
/// and reported as `TimedOut`; failures never cancel their siblings.
pub async fn join_all_until<T, F>(fetches: Vec<F>, deadline: Duration) -> Vec<Settlement<T>>
where
    F: Future<Output = Result<T, FetchError>>,
{
    let expected = fetches.len();
    let mut slots: Vec<Option<Settlement<T>>> = (0..expected).map(|_| None).collect();
    let mut pending: FuturesUnordered<_> = fetches
        .into_iter()
        .enumerate()
        .map(|(index, fetch)| async move { (index, fetch.await) })
        .collect();

    let close_at = Instant::now() + deadline;
    let mut settled = 0;
    while settled < expected {
        match tokio::time::timeout_at(close_at, pending.next()).await {
            Ok(Some((index, result))) => {
                slots[index] = Some(match result {
                    Ok(value) => Settlement::Delivered(value),
                    Err(e) => Settlement::Failed(e),
                });
                settled += 1;
                tracing::debug!("fan-in settled {}/{}", settled, expected);
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    "fan-in deadline of {:?} reached with {}/{} settled",
                    deadline,
                    settled,
                    expected
                );
                break;
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Settlement::TimedOut))
        .collect()
}
