//! Domain types for the Ridepool marketplace.
//!
//! This module contains the identifiers and value objects shared by the
//! reservation ledger: ride/booking/user identities, seat counts, booking
//! lifecycle states, and the ride publication spec.

use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ride
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RideId(Uuid);

impl RideId {
    /// Creates a new random `RideId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RideId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RideId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user.
///
/// Drivers and passengers share one identity space; a user may publish rides
/// and book seats on other people's rides with the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Seat Count Value Object
// ============================================================================

/// A validated, strictly positive number of seats.
///
/// Every seat quantity flowing through the ledger (ride capacity, requested
/// seats, reserve/release deltas) is a `SeatCount`, so the "seats > 0"
/// precondition is enforced once, at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatCount(u32);

impl SeatCount {
    /// Creates a `SeatCount` from a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSeatCount`] if `seats` is zero.
    pub const fn new(seats: u32) -> Result<Self, LedgerError> {
        if seats == 0 {
            Err(LedgerError::InvalidSeatCount(seats))
        } else {
            Ok(Self(seats))
        }
    }

    /// Returns the raw seat quantity
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeatCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents a price in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Booking Lifecycle State
// ============================================================================

/// Lifecycle state of a booking.
///
/// The allowed transitions are:
///
/// ```text
/// Pending ──→ Confirmed ──→ Cancelled
///    │
///    ├──→ Rejected
///    └──→ Cancelled
/// ```
///
/// `Rejected` and `Cancelled` are terminal; no transition leaves them.
/// Rejection is a pre-commitment refusal and is only valid from `Pending`;
/// a `Confirmed` booking must be cancelled instead, which releases its
/// seats back to the ride's inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    /// Requested by a passenger, awaiting the driver's decision. Holds no
    /// inventory.
    Pending,
    /// Accepted by the driver; the booking's seats are reserved in the
    /// ride's inventory.
    Confirmed,
    /// Refused by the driver before any seats were committed. Terminal.
    Rejected,
    /// Withdrawn by the passenger (or on their behalf). Terminal.
    Cancelled,
}

impl BookingState {
    /// Whether this state is terminal (no further transitions allowed)
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// Whether this booking still counts against a ride's withdrawal guard
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether the state machine permits moving from `self` to `next`
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Ride Publication Spec
// ============================================================================

/// Input describing a ride a driver wants to publish.
///
/// Capacity is fixed at publication; the ledger initialises the available
/// counter to the full capacity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideSpec {
    /// Where the ride departs from
    pub origin: String,
    /// Where the ride goes
    pub destination: String,
    /// Scheduled departure time
    pub departure: DateTime<Utc>,
    /// Total seat capacity (immutable after creation)
    pub capacity: SeatCount,
    /// Price per seat
    pub price_per_seat: Money,
}
