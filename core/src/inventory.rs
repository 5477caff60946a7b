//! Ride inventory: the seat counters that must never go wrong.
//!
//! A [`RideInventory`] owns a ride's immutable capacity and its mutable
//! available-seats counter. It is the unit of consistency for the
//! reservation subsystem: `0 <= available <= capacity` at all times, and
//! `available + confirmed seats == capacity` after every ledger operation.
//!
//! Mutation is crate-private. Only the [`ReservationLedger`] touches the
//! counters, under the ride's lock, so there is no external mutation path.
//!
//! [`ReservationLedger`]: crate::ledger::ReservationLedger

use crate::error::LedgerError;
use crate::types::{Money, RideId, RideSpec, SeatCount, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seat capacity and availability for one published ride.
///
/// Fields are private; reads go through the getters and writes go through
/// the crate-private [`reserve`](Self::reserve) / [`release`](Self::release)
/// used by the ledger. The inventory never holds a live collection of
/// bookings; bookings reference the ride by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RideInventory {
    id: RideId,
    driver: UserId,
    origin: String,
    destination: String,
    departure: DateTime<Utc>,
    price_per_seat: Money,
    capacity: u32,
    available: u32,
}

impl RideInventory {
    /// Creates the inventory for a freshly published ride, with every seat
    /// available.
    pub(crate) fn new(id: RideId, driver: UserId, spec: RideSpec) -> Self {
        let capacity = spec.capacity.get();
        Self {
            id,
            driver,
            origin: spec.origin,
            destination: spec.destination,
            departure: spec.departure,
            price_per_seat: spec.price_per_seat,
            capacity,
            available: capacity,
        }
    }

    /// Atomically decrements `available` by `seats`.
    ///
    /// Fails without mutation when fewer than `seats` are available.
    pub(crate) fn reserve(&mut self, seats: SeatCount) -> Result<(), LedgerError> {
        let requested = seats.get();
        if self.available < requested {
            return Err(LedgerError::InsufficientCapacity {
                requested,
                available: self.available,
            });
        }
        self.available -= requested;
        Ok(())
    }

    /// Increments `available` by `seats`.
    ///
    /// Releasing more seats than were ever reserved means the ledger's
    /// books no longer balance. The counter saturates at `capacity` so the
    /// invariant `available <= capacity` survives, and a
    /// [`LedgerError::ConsistencyViolation`] is returned for the caller to
    /// surface and alert on.
    pub(crate) fn release(&mut self, seats: SeatCount) -> Result<(), LedgerError> {
        let released = seats.get();
        let target = self.available.saturating_add(released);
        if target > self.capacity {
            let detail = format!(
                "releasing {released} seat(s) on ride {} would push available past capacity \
                 (available {}, capacity {})",
                self.id, self.available, self.capacity
            );
            self.available = self.capacity;
            return Err(LedgerError::ConsistencyViolation(detail));
        }
        self.available = target;
        Ok(())
    }

    /// Whether the ride's scheduled departure has passed as of `now`
    #[must_use]
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.departure <= now
    }

    /// Ride identity
    #[must_use]
    pub const fn id(&self) -> RideId {
        self.id
    }

    /// The driver who published the ride
    #[must_use]
    pub const fn driver(&self) -> UserId {
        self.driver
    }

    /// Where the ride departs from
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Where the ride goes
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Scheduled departure time
    #[must_use]
    pub const fn departure(&self) -> DateTime<Utc> {
        self.departure
    }

    /// Price per seat
    #[must_use]
    pub const fn price_per_seat(&self) -> Money {
        self.price_per_seat
    }

    /// Total seat capacity (immutable after creation)
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Seats currently available for reservation
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.available
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::Duration;

    fn inventory(capacity: u32) -> RideInventory {
        RideInventory::new(
            RideId::new(),
            UserId::new(),
            RideSpec {
                origin: "Nantes".into(),
                destination: "Paris".into(),
                departure: Utc::now() + Duration::hours(6),
                capacity: SeatCount::new(capacity).unwrap(),
                price_per_seat: Money::from_cents(2500),
            },
        )
    }

    fn seats(n: u32) -> SeatCount {
        SeatCount::new(n).unwrap()
    }

    #[test]
    fn reserve_decrements_when_enough_seats() {
        let mut inv = inventory(4);
        inv.reserve(seats(3)).unwrap();
        assert_eq!(inv.available(), 1);
        assert_eq!(inv.capacity(), 4);
    }

    #[test]
    fn reserve_fails_without_mutation_when_short() {
        let mut inv = inventory(2);
        let err = inv.reserve(seats(3)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientCapacity {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(inv.available(), 2);
    }

    #[test]
    fn release_restores_reserved_seats() {
        let mut inv = inventory(4);
        inv.reserve(seats(3)).unwrap();
        inv.release(seats(3)).unwrap();
        assert_eq!(inv.available(), 4);
    }

    #[test]
    fn release_past_capacity_saturates_and_reports() {
        let mut inv = inventory(4);
        inv.reserve(seats(1)).unwrap();
        let err = inv.release(seats(2)).unwrap_err();
        assert!(err.is_consistency_violation());
        // Safe boundary: the counter is clamped, never above capacity.
        assert_eq!(inv.available(), 4);
    }

    #[test]
    fn departure_check() {
        let inv = inventory(2);
        assert!(!inv.has_departed(Utc::now()));
        assert!(inv.has_departed(Utc::now() + Duration::hours(7)));
    }
}
