//! In-process notification store fed by the ledger's event stream.
//!
//! The reservation ledger emits fire-and-forget [`BookingEvent`]s; the
//! [`drain`] task turns them into [`Notification`] rows users can list and
//! mark as read. Losing a notification never affects a reservation, and a
//! slow store never blocks the ledger (the channel is unbounded and the
//! ledger does not wait).

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ridepool_core::{BookingEvent, BookingId, Clock, EventKind, RideId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random `NotificationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `NotificationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in a user's notification feed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identity
    pub id: NotificationId,
    /// The user this notification is addressed to
    pub recipient: UserId,
    /// What kind of booking transition produced it
    pub kind: EventKind,
    /// Human-readable summary
    pub message: String,
    /// The ride involved
    pub ride_id: RideId,
    /// The booking involved
    pub booking_id: BookingId,
    /// When the notification was recorded
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has seen it
    pub read: bool,
}

/// Concurrent, in-memory notification store.
#[derive(Debug, Default)]
pub struct NotificationStore {
    entries: DashMap<NotificationId, Notification>,
}

impl NotificationStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one domain event as an unread notification
    pub fn record(&self, event: BookingEvent, now: DateTime<Utc>) -> Notification {
        let notification = Notification {
            id: NotificationId::new(),
            recipient: event.recipient,
            kind: event.kind,
            message: event.message,
            ride_id: event.ride_id,
            booking_id: event.booking_id,
            created_at: now,
            read: false,
        };
        self.entries.insert(notification.id, notification.clone());
        notification
    }

    /// A user's notifications, newest first
    #[must_use]
    pub fn for_user(&self, user: UserId) -> Vec<Notification> {
        let mut out: Vec<Notification> = self
            .entries
            .iter()
            .filter(|entry| entry.recipient == user)
            .map(|entry| entry.clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// How many of a user's notifications are unread
    #[must_use]
    pub fn unread_count(&self, user: UserId) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.recipient == user && !entry.read)
            .count()
    }

    /// Marks one notification as read; returns `false` when it is unknown
    pub fn mark_read(&self, id: NotificationId) -> bool {
        match self.entries.get_mut(&id) {
            Some(mut entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    /// Marks every notification of a user as read, returning how many
    /// changed
    pub fn mark_all_read(&self, user: UserId) -> usize {
        let mut updated = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.recipient == user && !entry.read {
                entry.read = true;
                updated += 1;
            }
        }
        updated
    }
}

/// Drains the ledger's event channel into the store until the sender side
/// is dropped.
pub async fn drain(
    mut rx: UnboundedReceiver<BookingEvent>,
    store: Arc<NotificationStore>,
    clock: Arc<dyn Clock>,
) {
    while let Some(event) = rx.recv().await {
        debug!(
            kind = %event.kind,
            recipient = %event.recipient,
            booking_id = %event.booking_id,
            "recording notification"
        );
        store.record(event, clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(recipient: UserId, kind: EventKind) -> BookingEvent {
        BookingEvent {
            recipient,
            kind,
            message: "hello".into(),
            ride_id: RideId::new(),
            booking_id: BookingId::new(),
        }
    }

    #[test]
    fn record_and_list_newest_first() {
        let store = NotificationStore::new();
        let user = UserId::new();
        let t0 = Utc::now();

        store.record(event(user, EventKind::BookingRequested), t0);
        store.record(
            event(user, EventKind::BookingAccepted),
            t0 + chrono::Duration::seconds(5),
        );
        store.record(event(UserId::new(), EventKind::BookingRejected), t0);

        let feed = store.for_user(user);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, EventKind::BookingAccepted);
        assert_eq!(feed[1].kind, EventKind::BookingRequested);
    }

    #[test]
    fn read_tracking() {
        let store = NotificationStore::new();
        let user = UserId::new();
        let n = store.record(event(user, EventKind::BookingRequested), Utc::now());
        store.record(event(user, EventKind::BookingAccepted), Utc::now());

        assert_eq!(store.unread_count(user), 2);
        assert!(store.mark_read(n.id));
        assert_eq!(store.unread_count(user), 1);
        assert!(!store.mark_read(NotificationId::new()));

        assert_eq!(store.mark_all_read(user), 1);
        assert_eq!(store.unread_count(user), 0);
    }
}
