//! Error taxonomy for the reservation ledger.
//!
//! Every ledger operation is all-or-nothing: when one of these errors is
//! returned, neither the booking nor the ride inventory was mutated.

use crate::types::{BookingId, BookingState, RideId, UserId};
use thiserror::Error;

/// Errors returned by ledger operations.
///
/// All variants except [`LedgerError::ConsistencyViolation`] describe a
/// client-facing rejection (bad input, missing entity, or a state-machine
/// rule). `ConsistencyViolation` means an internal invariant was breached;
/// it indicates a bug, is logged at `error` level where detected, and maps
/// to a generic server error at the HTTP boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The referenced ride does not exist (or was withdrawn).
    #[error("ride {0} not found")]
    RideNotFound(RideId),

    /// The referenced booking does not exist.
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),

    /// The referenced user is unknown to the directory.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Requested seat count was not strictly positive.
    #[error("requested seats must be greater than zero (got {0})")]
    InvalidSeatCount(u32),

    /// The ride's departure time has already passed.
    #[error("ride {0} has already departed")]
    RideDeparted(RideId),

    /// The ride's inventory cannot satisfy the reservation.
    #[error("not enough available seats (requested {requested}, available {available})")]
    InsufficientCapacity {
        /// Seats the operation tried to reserve
        requested: u32,
        /// Seats the ride had available
        available: u32,
    },

    /// The booking state machine does not permit the attempted transition.
    #[error("cannot move booking from {from} to {attempted}")]
    InvalidTransition {
        /// State the booking was in
        from: BookingState,
        /// State the operation tried to reach
        attempted: BookingState,
    },

    /// The ride cannot be withdrawn while bookings are pending or confirmed.
    #[error("ride {0} still has pending or confirmed bookings")]
    HasActiveBookings(RideId),

    /// An internal invariant was breached. Never expected in correct
    /// operation; treated as fatal/alerting rather than a user error.
    #[error("seat ledger consistency violation: {0}")]
    ConsistencyViolation(String),
}

impl LedgerError {
    /// Whether this error indicates an internal bug rather than a
    /// client-facing rejection
    #[must_use]
    pub const fn is_consistency_violation(&self) -> bool {
        matches!(self, Self::ConsistencyViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookingState;

    #[test]
    fn error_messages_are_explanatory() {
        let err = LedgerError::InsufficientCapacity {
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "not enough available seats (requested 3, available 1)"
        );

        let err = LedgerError::InvalidTransition {
            from: BookingState::Confirmed,
            attempted: BookingState::Rejected,
        };
        assert_eq!(err.to_string(), "cannot move booking from CONFIRMED to REJECTED");
    }

    #[test]
    fn consistency_violation_is_flagged() {
        assert!(LedgerError::ConsistencyViolation("boom".into()).is_consistency_violation());
        assert!(!LedgerError::InvalidSeatCount(0).is_consistency_violation());
    }
}
