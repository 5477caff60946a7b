//! Booking records and their lifecycle transitions.

use crate::error::LedgerError;
use crate::types::{BookingId, BookingState, RideId, SeatCount, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One passenger's request for seats on a ride.
///
/// A `BookingRecord` references its ride by id (a foreign-key style
/// relation, never an owning pointer) and is owned and mutated exclusively
/// by the reservation ledger under the ride's lock. Values handed out by
/// the read path are snapshots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Booking identity
    pub id: BookingId,
    /// The ride this booking requests seats on
    pub ride_id: RideId,
    /// The passenger who made the request
    pub passenger: UserId,
    /// Requested seat count
    pub seats: SeatCount,
    /// Current lifecycle state
    pub state: BookingState,
    /// When the booking was requested
    pub created_at: DateTime<Utc>,
    /// When the booking last changed state (or seats)
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Creates a fresh `Pending` booking.
    pub(crate) fn new(
        ride_id: RideId,
        passenger: UserId,
        seats: SeatCount,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookingId::new(),
            ride_id,
            passenger,
            seats,
            state: BookingState::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the booking to `next`, enforcing the state machine.
    ///
    /// The transition timestamp is bumped only when the transition is
    /// accepted; a rejected transition leaves the record untouched.
    pub(crate) fn transition(
        &mut self,
        next: BookingState,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if !self.state.can_transition_to(next) {
            return Err(LedgerError::InvalidTransition {
                from: self.state,
                attempted: next,
            });
        }
        self.state = next;
        self.updated_at = now;
        Ok(())
    }
}
