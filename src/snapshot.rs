//! Client-side cache of a fetched list that ignores superseded responses.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Handle for one in-flight fetch. Only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug)]
struct Loaded<T> {
    items: Vec<T>,
    fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct RecordSnapshot<T> {
    generation: AtomicU64,
    state: RwLock<Loaded<T>>,
}

impl<T> Default for RecordSnapshot<T> {
    fn default() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: RwLock::new(Loaded {
                items: Vec::new(),
                fetched_at: None,
            }),
        }
    }
}

impl<T: Clone> RecordSnapshot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding every ticket handed out before.
    pub fn begin_fetch(&self) -> FetchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket { generation }
    }

    /// Abandon whatever fetch is in flight, e.g. when the view goes away.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Store `items` if `ticket` is still the newest. Returns whether it was applied.
    pub async fn commit(&self, ticket: FetchTicket, items: Vec<T>) -> bool {
        let mut state = self.state.write().await;
        // Checked under the write lock so a newer commit cannot interleave.
        if !self.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "discarding stale response");
            return false;
        }
        state.items = items;
        state.fetched_at = Some(Utc::now());
        true
    }

    /// Record a failed fetch. Previously loaded items stay in place.
    pub fn fail(&self, ticket: FetchTicket, error: &dyn std::fmt::Display) {
        if self.is_current(ticket) {
            tracing::warn!(error = %error, "fetch failed, keeping previous data");
        }
    }

    /// Run `fetch` under a new ticket and commit its result if still current.
    /// Returns whether the snapshot was updated.
    pub async fn refresh<E, F>(&self, fetch: F) -> bool
    where
        E: std::fmt::Display,
        F: Future<Output = Result<Vec<T>, E>>,
    {
        let ticket = self.begin_fetch();
        match fetch.await {
            Ok(items) => self.commit(ticket, items).await,
            Err(err) => {
                self.fail(ticket, &err);
                false
            }
        }
    }

    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items.clone()
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn newest_fetch_wins() {
        let snapshot = RecordSnapshot::new();
        let slow = snapshot.begin_fetch();
        let fast = snapshot.begin_fetch();

        assert!(snapshot.commit(fast, vec!["fresh"]).await);
        assert!(!snapshot.commit(slow, vec!["stale"]).await);
        assert_eq!(snapshot.items().await, vec!["fresh"]);
    }

    #[tokio::test]
    async fn cancel_discards_in_flight_response() {
        let snapshot = RecordSnapshot::new();
        let ticket = snapshot.begin_fetch();
        snapshot.cancel();
        assert!(!snapshot.commit(ticket, vec![1, 2, 3]).await);
        assert!(snapshot.items().await.is_empty());
        assert!(snapshot.fetched_at().await.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_previous_items() {
        let snapshot = RecordSnapshot::new();
        let first = snapshot.begin_fetch();
        snapshot.commit(first, vec![1, 2]).await;

        let second = snapshot.begin_fetch();
        snapshot.fail(second, &"connection reset");
        assert_eq!(snapshot.items().await, vec![1, 2]);
        assert!(snapshot.fetched_at().await.is_some());
    }

    #[tokio::test]
    async fn refresh_replaces_items_and_survives_errors() {
        let snapshot = RecordSnapshot::new();
        assert!(snapshot.refresh(async { Ok::<_, String>(vec!["a", "b"]) }).await);
        assert_eq!(snapshot.items().await, vec!["a", "b"]);

        assert!(!snapshot.refresh(async { Err::<Vec<&str>, _>("timeout") }).await);
        assert_eq!(snapshot.items().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn refresh_started_later_wins() {
        let snapshot = RecordSnapshot::new();
        let (release_slow, slow_gate) = tokio::sync::oneshot::channel::<()>();

        let slow = snapshot.refresh(async {
            let _ = slow_gate.await;
            Ok::<_, String>(vec!["stale"])
        });
        let fast = async {
            // Starts after the slow fetch took its ticket, finishes first.
            tokio::task::yield_now().await;
            let applied = snapshot.refresh(async { Ok::<_, String>(vec!["fresh"]) }).await;
            let _ = release_slow.send(());
            applied
        };

        let (slow_applied, fast_applied) = tokio::join!(slow, fast);
        assert!(fast_applied);
        assert!(!slow_applied);
        assert_eq!(snapshot.items().await, vec!["fresh"]);
    }
}
