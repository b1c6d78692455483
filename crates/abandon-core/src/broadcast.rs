//! Fan-out of committed game events to push-channel observers.
//!
//! Wraps a [`tokio::sync::broadcast`] channel. Each observer holds its own
//! receiver; a slow observer that falls more than `capacity` events behind
//! skips ahead (`RecvError::Lagged`) without affecting anyone else.

use abandon_types::GameEvent;
use tokio::sync::broadcast;

/// Registered-observer set for [`GameEvent`]s.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<GameEvent>,
}

impl EventHub {
    /// Create a hub that buffers up to `capacity` events per observer.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to every current observer.
    ///
    /// Returns the number of observers that will receive it. Zero observers
    /// is not an error.
    pub fn publish(&self, event: GameEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use abandon_types::{GameStats, Virus, VirusCreated, VirusId, VirusStatus};
    use tokio::sync::broadcast::error::RecvError;

    use super::*;

    fn created(n: u64) -> GameEvent {
        GameEvent::VirusCreated(VirusCreated {
            virus: Virus {
                id: VirusId::new(),
                hash: format!("000{n}"),
                created_by: "0xA".into(),
                created_at: 1,
                timestamp: 1,
                nonce: n,
                difficulty: 3,
                memo: None,
                status: VirusStatus::Active,
                eliminated_by: None,
                eliminated_at: None,
            },
            stats: GameStats {
                total_viruses_created: n,
                ..GameStats::default()
            },
        })
    }

    #[tokio::test]
    async fn publish_without_observers_is_fine() {
        let hub = EventHub::new(4);
        assert_eq!(hub.publish(created(1)), 0);
    }

    #[tokio::test]
    async fn every_observer_sees_events_in_order() {
        let hub = EventHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.observer_count(), 2);

        hub.publish(created(1));
        hub.publish(created(2));

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.recv().await.unwrap().stats().total_viruses_created, 1);
            assert_eq!(rx.recv().await.unwrap().stats().total_viruses_created, 2);
        }
    }

    #[tokio::test]
    async fn lagging_observer_skips_ahead() {
        let hub = EventHub::new(2);
        let mut slow = hub.subscribe();
        for n in 1..=5 {
            hub.publish(created(n));
        }
        assert!(matches!(slow.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(slow.recv().await.unwrap().stats().total_viruses_created, 4);
    }

    #[tokio::test]
    async fn dropped_observer_does_not_affect_others() {
        let hub = EventHub::new(4);
        let dropped = hub.subscribe();
        let mut live = hub.subscribe();
        drop(dropped);
        assert_eq!(hub.publish(created(1)), 1);
        assert!(live.recv().await.is_ok());
    }
}
