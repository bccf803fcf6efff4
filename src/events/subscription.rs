use std::collections::HashSet;

use uuid::Uuid;

use super::{Audience, ChangeEvent, Collection};

/// Identity of a WebSocket connection, fixed at upgrade time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    Customer(Uuid),
    Admin(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Customer(id) | Viewer::Admin(id) => Some(*id),
        }
    }

    pub fn may_subscribe(&self, collection: Collection) -> bool {
        match collection.audience() {
            Audience::Public => true,
            Audience::Owner => self.user_id().is_some(),
            Audience::Admin => matches!(self, Viewer::Admin(_)),
        }
    }

    fn may_see(&self, event: &ChangeEvent) -> bool {
        match event.collection.audience() {
            Audience::Owner => {
                self.user_id().is_some() && self.user_id() == event.user_id
            }
            _ => self.may_subscribe(event.collection),
        }
    }
}

/// Per-connection filter deciding which events reach a WebSocket client.
///
/// A wildcard subscription means every collection the viewer may read.
/// User-scoped events only ever reach their owner.
#[derive(Debug, Default)]
pub struct SubscriptionFilter {
    viewer: Viewer,
    collections: HashSet<Collection>,
    all: bool,
}

impl SubscriptionFilter {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            ..Self::default()
        }
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Adds the collections the viewer may read and returns the refused ones.
    pub fn subscribe(&mut self, collections: &[Collection], wildcard: bool) -> Vec<Collection> {
        if wildcard {
            self.all = true;
        }
        let mut refused = Vec::new();
        for collection in collections {
            if self.viewer.may_subscribe(*collection) {
                self.collections.insert(*collection);
            } else {
                refused.push(*collection);
            }
        }
        refused
    }

    pub fn unsubscribe(&mut self, collections: &[Collection], wildcard: bool) {
        if wildcard {
            self.all = false;
            self.collections.clear();
        }
        for collection in collections {
            self.collections.remove(collection);
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if !(self.all || self.collections.contains(&event.collection)) {
            return false;
        }
        self.viewer.may_see(event)
    }

    pub fn collections(&self) -> Vec<Collection> {
        let mut list: Vec<Collection> = self.collections.iter().copied().collect();
        list.sort_by_key(|c| format!("{c:?}"));
        list
    }

    pub fn is_wildcard(&self) -> bool {
        self.all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChangeAction;

    fn event(collection: Collection, user_id: Option<Uuid>) -> ChangeEvent {
        let mut event = ChangeEvent::new(collection, ChangeAction::Updated, vec![]);
        event.user_id = user_id;
        event
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = SubscriptionFilter::new(Viewer::Admin(Uuid::new_v4()));
        assert!(!filter.matches(&event(Collection::Souvenirs, None)));
    }

    #[test]
    fn collection_subscription_is_exact() {
        let mut filter = SubscriptionFilter::new(Viewer::Anonymous);
        assert!(filter.subscribe(&[Collection::Souvenirs], false).is_empty());
        assert!(filter.matches(&event(Collection::Souvenirs, None)));
        assert!(!filter.matches(&event(Collection::Categories, None)));

        filter.unsubscribe(&[Collection::Souvenirs], false);
        assert!(!filter.matches(&event(Collection::Souvenirs, None)));
    }

    #[test]
    fn anonymous_wildcard_only_sees_public_collections() {
        let mut filter = SubscriptionFilter::new(Viewer::Anonymous);
        filter.subscribe(&[], true);
        assert!(filter.is_wildcard());
        assert!(filter.matches(&event(Collection::Reviews, None)));
        assert!(!filter.matches(&event(Collection::Messages, None)));
        assert!(!filter.matches(&event(Collection::Users, None)));
        assert!(!filter.matches(&event(Collection::Orders, None)));
        assert!(!filter.matches(&event(Collection::CartItems, Some(Uuid::new_v4()))));
    }

    #[test]
    fn customers_cannot_subscribe_to_admin_collections() {
        let mut filter = SubscriptionFilter::new(Viewer::Customer(Uuid::new_v4()));
        let refused = filter.subscribe(
            &[Collection::Orders, Collection::Notifications, Collection::Messages],
            false,
        );
        assert_eq!(refused, vec![Collection::Orders, Collection::Messages]);
        assert_eq!(filter.collections(), vec![Collection::Notifications]);
    }

    #[test]
    fn owner_events_reach_only_the_owner() {
        let me = Uuid::new_v4();
        let mut filter = SubscriptionFilter::new(Viewer::Customer(me));
        filter.subscribe(&[], true);

        assert!(filter.matches(&event(Collection::Notifications, Some(me))));
        assert!(!filter.matches(&event(Collection::Notifications, Some(Uuid::new_v4()))));
        assert!(!filter.matches(&event(Collection::CartItems, None)));
    }

    #[test]
    fn admins_see_admin_collections_but_not_other_carts() {
        let admin = Uuid::new_v4();
        let mut filter = SubscriptionFilter::new(Viewer::Admin(admin));
        filter.subscribe(&[], true);

        assert!(filter.matches(&event(Collection::Users, None)));
        assert!(filter.matches(&event(Collection::Orders, None)));
        assert!(filter.matches(&event(Collection::Notifications, Some(admin))));
        assert!(!filter.matches(&event(Collection::CartItems, Some(Uuid::new_v4()))));
    }
}
