//! Ridepool core - the seat-inventory reservation subsystem.
//!
//! Drivers publish rides with a fixed seat capacity; passengers request
//! bookings against that capacity. This crate owns the part with real
//! invariants: seat counters that must never go negative or be
//! double-allocated, and a booking state machine whose transitions mutate
//! those counters atomically.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            ReservationLedger                │  ← the only mutation path
//! │  per-ride lock around inventory + bookings  │
//! ├──────────────────────┬──────────────────────┤
//! │    RideInventory     │    BookingRecord     │
//! │  capacity/available  │   lifecycle state    │
//! └──────────────────────┴──────────────────────┘
//!            │ events (after the lock is released)
//!            ▼
//!   NotificationEmitter (fire-and-forget collaborator)
//! ```
//!
//! # Booking lifecycle
//!
//! `PENDING → CONFIRMED → CANCELLED`, `PENDING → REJECTED`,
//! `PENDING → CANCELLED`. Seats are reserved at *acceptance*, not at
//! request time, so abandoned pending requests never lock up inventory.
//! Cancelling a confirmed booking releases its seats; rejecting is only
//! possible before any seats were committed.
//!
//! # Invariant
//!
//! For every ride, after every operation:
//!
//! ```text
//! available + Σ seats(CONFIRMED bookings) == capacity
//! ```
//!
//! [`ReservationLedger::audit_ride`] recomputes this defensively; a breach
//! is a [`LedgerError::ConsistencyViolation`], never a user error.
//!
//! # What this crate does not do
//!
//! Registration, authentication, authorization (driver-only /
//! passenger-only checks), HTTP routing, persistence, and notification
//! delivery all belong to the surrounding system. Identity lookup and
//! notification fan-out are consumed through the [`UserDirectory`] and
//! [`NotificationEmitter`] traits.

pub mod booking;
pub mod clock;
pub mod directory;
pub mod error;
pub mod events;
pub mod inventory;
pub mod ledger;
pub mod types;

pub use booking::BookingRecord;
pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{InMemoryDirectory, UserDirectory, UserProfile};
pub use error::LedgerError;
pub use events::{BookingEvent, ChannelEmitter, EventKind, NotificationEmitter, NullEmitter};
pub use inventory::RideInventory;
pub use ledger::ReservationLedger;
pub use types::{BookingId, BookingState, Money, RideId, RideSpec, SeatCount, UserId};
