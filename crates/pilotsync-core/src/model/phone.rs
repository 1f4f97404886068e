use indexmap::IndexMap;
use serde::Serialize;

use pilotsync_api::protocol::{Notification, PhoneState, PhoneType};

/// Paired phone status and its notification feed.
///
/// Notifications are keyed by id and kept in first-seen order; a repeat
/// id updates the existing entry in place. The backend always sends its
/// whole feed, so an id missing from the latest list has been dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Phone {
    pub enabled: bool,
    pub connected: bool,
    #[serde(rename = "type")]
    pub device_type: Option<PhoneType>,
    pub state: PhoneState,
    #[serde(serialize_with = "serialize_notifications")]
    pub(crate) notifications: IndexMap<u64, Notification>,
}

impl Phone {
    /// Notifications in first-seen order.
    pub fn notifications(&self) -> impl ExactSizeIterator<Item = &Notification> {
        self.notifications.values()
    }

    pub fn notification(&self, id: u64) -> Option<&Notification> {
        self.notifications.get(&id)
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    /// Insert a notification, or update the entry with the same id
    /// without moving it.
    pub(crate) fn upsert_notification(&mut self, notification: Notification) {
        self.notifications.insert(notification.id, notification);
    }

    /// Reconcile against a full feed: drop dismissed ids, upsert the rest.
    pub(crate) fn sync_notifications(&mut self, feed: Vec<Notification>) {
        self.notifications.retain(|id, _| feed.iter().any(|n| n.id == *id));
        for notification in feed {
            self.upsert_notification(notification);
        }
    }
}

fn serialize_notifications<S>(
    notifications: &IndexMap<u64, Notification>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(notifications.values())
}
