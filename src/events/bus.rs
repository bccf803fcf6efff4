use tokio::sync::broadcast;

use super::{ChangeAction, ChangeEvent, Collection};

/// Broadcast bus for [`ChangeEvent`]s.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers; clients recover by re-fetching.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of receivers that got the event; zero when nobody listens.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        tracing::debug!(
            collection = ?event.collection,
            action = ?event.action,
            ids = event.ids.len(),
            "change event"
        );
        self.sender.send(event).unwrap_or(0)
    }

    pub fn notify(&self, collection: Collection, action: ChangeAction, ids: Vec<uuid::Uuid>) {
        self.publish(ChangeEvent::new(collection, action, ids));
    }

    pub fn notify_user(
        &self,
        collection: Collection,
        action: ChangeAction,
        ids: Vec<uuid::Uuid>,
        user_id: uuid::Uuid,
    ) {
        self.publish(ChangeEvent::new(collection, action, ids).for_user(user_id));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        let sent = bus.publish(ChangeEvent::new(
            Collection::Souvenirs,
            ChangeAction::Created,
            vec![Uuid::new_v4()],
        ));
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_event() {
        let bus = EventBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        let id = Uuid::new_v4();
        bus.notify(Collection::Orders, ChangeAction::Updated, vec![id]);

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert_eq!(a.ids, vec![id]);
        assert_eq!(a, b);
        assert_eq!(a.collection, Collection::Orders);
    }

    #[tokio::test]
    async fn user_scoped_events_carry_owner() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let owner = Uuid::new_v4();
        bus.notify_user(Collection::CartItems, ChangeAction::Deleted, vec![], owner);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.user_id, Some(owner));
        assert!(event.collection.is_user_scoped());
    }
}
