//! Domain events and the notification contract.
//!
//! Every accepted booking transition produces a [`BookingEvent`] describing
//! the outcome for the interested party (the driver for new requests, the
//! passenger for accept/reject decisions). Events are handed to a
//! [`NotificationEmitter`] strictly *after* the ride's critical section is
//! released, and delivery is fire-and-forget: a slow or absent consumer
//! never stalls or rolls back a reservation.

use crate::types::{BookingId, RideId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::warn;

// ============================================================================
// Events
// ============================================================================

/// The kind of booking transition an event describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A passenger requested seats; sent to the ride's driver
    BookingRequested,
    /// The driver accepted the booking; sent to the passenger
    BookingAccepted,
    /// The driver rejected the booking; sent to the passenger
    BookingRejected,
    /// The booking was cancelled; driver-visible audit record
    BookingCancelled,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BookingRequested => "BOOKING_REQUESTED",
            Self::BookingAccepted => "BOOKING_ACCEPTED",
            Self::BookingRejected => "BOOKING_REJECTED",
            Self::BookingCancelled => "BOOKING_CANCELLED",
        };
        write!(f, "{name}")
    }
}

/// A domain event emitted on an accepted booking transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Who the event is addressed to (driver or passenger, depending on
    /// the direction of the transition)
    pub recipient: UserId,
    /// What happened
    pub kind: EventKind,
    /// Human-readable summary suitable for a notification feed
    pub message: String,
    /// The ride involved
    pub ride_id: RideId,
    /// The booking involved
    pub booking_id: BookingId,
}

// ============================================================================
// Emitter Contract
// ============================================================================

/// Consumer side of the ledger's event stream.
///
/// Implementations must not block: the ledger calls `emit` synchronously
/// (outside any ride lock) and does not inspect delivery outcomes.
pub trait NotificationEmitter: Send + Sync {
    /// Hand one event to the notification side. Fire-and-forget.
    fn emit(&self, event: BookingEvent);
}

/// Emitter that forwards events into an unbounded channel.
///
/// The receiving half is typically drained by a background task feeding a
/// notification store or delivery pipeline. If the receiver is gone the
/// event is dropped with a warning; reservation throughput is unaffected.
#[derive(Clone, Debug)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<BookingEvent>,
}

impl ChannelEmitter {
    /// Creates an emitter together with the receiver that drains it
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BookingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationEmitter for ChannelEmitter {
    fn emit(&self, event: BookingEvent) {
        if let Err(err) = self.tx.send(event) {
            let event = err.0;
            warn!(
                kind = %event.kind,
                booking_id = %event.booking_id,
                "notification receiver dropped; event discarded"
            );
        }
    }
}

/// Emitter that discards every event; useful in tests that only exercise
/// ledger state
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEmitter;

impl NotificationEmitter for NullEmitter {
    fn emit(&self, _event: BookingEvent) {}
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn event(kind: EventKind) -> BookingEvent {
        BookingEvent {
            recipient: UserId::new(),
            kind,
            message: "test".into(),
            ride_id: RideId::new(),
            booking_id: BookingId::new(),
        }
    }

    #[test]
    fn channel_emitter_delivers_in_order() {
        let (emitter, mut rx) = ChannelEmitter::channel();
        emitter.emit(event(EventKind::BookingRequested));
        emitter.emit(event(EventKind::BookingAccepted));

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::BookingRequested);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::BookingAccepted);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emit_survives_dropped_receiver() {
        let (emitter, rx) = ChannelEmitter::channel();
        drop(rx);
        // Must not panic or block.
        emitter.emit(event(EventKind::BookingRejected));
    }

    #[test]
    fn event_kind_wire_format() {
        let json = serde_json::to_string(&EventKind::BookingRequested).unwrap();
        assert_eq!(json, "\"BOOKING_REQUESTED\"");
    }
}
