//! The reservation ledger: atomic, invariant-preserving booking transitions.
//!
//! The ledger owns the entity store for rides and bookings and is the only
//! mutation path for either. Concurrency is handled at ride granularity:
//!
//! - The store is a concurrent map keyed by [`RideId`]; each entry carries
//!   its own mutex guarding that ride's inventory *and* every booking that
//!   references it. Operations against different rides never contend.
//! - Every operation is a single bounded read-modify-write under the ride's
//!   lock. There is no await point and no external call inside the critical
//!   section; directory lookups happen before the lock is taken and event
//!   emission happens after it is released.
//! - Events are fire-and-forget. A slow notification consumer cannot stall
//!   reservation throughput or roll a reservation back.
//!
//! Per-ride serialization is what makes the "last seat" race safe: two
//! concurrent accepts of the final seat are applied in some order, the
//! first reserves it, the second observes `InsufficientCapacity`.

use crate::booking::BookingRecord;
use crate::clock::Clock;
use crate::directory::UserDirectory;
use crate::error::LedgerError;
use crate::events::{BookingEvent, EventKind, NotificationEmitter};
use crate::inventory::RideInventory;
use crate::types::{BookingId, BookingState, RideId, RideSpec, SeatCount, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};

/// One ride's unit of consistency: its inventory plus the bookings that
/// reference it, guarded together by a single mutex.
#[derive(Debug)]
struct RideCell {
    inventory: RideInventory,
    bookings: HashMap<BookingId, BookingRecord>,
    /// Set under the lock when the ride is withdrawn, so an operation that
    /// grabbed the cell just before removal observes the tombstone instead
    /// of mutating a detached entry.
    withdrawn: bool,
}

/// Acquires a ride's critical section.
///
/// A poisoned lock means a thread panicked mid-mutation; the cell can no
/// longer be trusted, which is exactly what `ConsistencyViolation` means.
fn lock(cell: &Mutex<RideCell>) -> Result<MutexGuard<'_, RideCell>, LedgerError> {
    cell.lock()
        .map_err(|_| LedgerError::ConsistencyViolation("ride lock poisoned".to_string()))
}

/// The seat-inventory reservation state machine.
///
/// All booking lifecycle operations go through this type. Each returns the
/// updated snapshot on success and a typed [`LedgerError`] on failure, with
/// no partial mutation in either case.
pub struct ReservationLedger {
    rides: DashMap<RideId, Arc<Mutex<RideCell>>>,
    /// Foreign-key index so booking-scoped operations can find the ride
    /// whose lock serializes them.
    booking_index: DashMap<BookingId, RideId>,
    directory: Arc<dyn UserDirectory>,
    emitter: Arc<dyn NotificationEmitter>,
    clock: Arc<dyn Clock>,
}

impl ReservationLedger {
    /// Creates an empty ledger wired to its collaborators
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        emitter: Arc<dyn NotificationEmitter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rides: DashMap::new(),
            booking_index: DashMap::new(),
            directory,
            emitter,
            clock,
        }
    }

    // ========================================================================
    // Ride lifecycle
    // ========================================================================

    /// Publishes a ride with every seat available.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UserNotFound`] if the driver does not resolve
    /// in the directory.
    pub fn publish_ride(
        &self,
        driver: UserId,
        spec: RideSpec,
    ) -> Result<RideInventory, LedgerError> {
        if self.directory.find_user(driver).is_none() {
            return Err(LedgerError::UserNotFound(driver));
        }

        let ride_id = RideId::new();
        let inventory = RideInventory::new(ride_id, driver, spec);
        let snapshot = inventory.clone();
        self.rides.insert(
            ride_id,
            Arc::new(Mutex::new(RideCell {
                inventory,
                bookings: HashMap::new(),
                withdrawn: false,
            })),
        );

        info!(ride_id = %ride_id, driver = %driver, "ride published");
        Ok(snapshot)
    }

    /// Withdraws a ride, removing it from the store.
    ///
    /// Only permitted while no referencing booking is pending or confirmed;
    /// terminal bookings do not block withdrawal.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RideNotFound`] or
    /// [`LedgerError::HasActiveBookings`].
    pub fn withdraw_ride(&self, ride_id: RideId) -> Result<(), LedgerError> {
        let cell_arc = self.ride_cell(ride_id)?;
        let booking_ids: Vec<BookingId> = {
            let mut guard = lock(&cell_arc)?;
            let cell = &mut *guard;
            if cell.withdrawn {
                return Err(LedgerError::RideNotFound(ride_id));
            }
            if cell.bookings.values().any(|b| b.state.is_active()) {
                return Err(LedgerError::HasActiveBookings(ride_id));
            }
            cell.withdrawn = true;
            cell.bookings.keys().copied().collect()
        };

        self.rides.remove(&ride_id);
        for booking_id in booking_ids {
            self.booking_index.remove(&booking_id);
        }

        info!(ride_id = %ride_id, "ride withdrawn");
        Ok(())
    }

    // ========================================================================
    // Booking lifecycle
    // ========================================================================

    /// Creates a `Pending` booking for `seats` seats on a ride.
    ///
    /// Inventory is *not* decremented here: the seat commitment is deferred
    /// to acceptance, so abandoned pending requests never starve a ride of
    /// seats. Emits `BOOKING_REQUESTED` to the ride's driver.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSeatCount`] for a zero seat count,
    /// [`LedgerError::UserNotFound`] for an unknown passenger,
    /// [`LedgerError::RideNotFound`] for a missing or withdrawn ride, and
    /// [`LedgerError::RideDeparted`] once the departure time has passed.
    pub fn request_booking(
        &self,
        ride_id: RideId,
        passenger: UserId,
        seats: u32,
    ) -> Result<BookingRecord, LedgerError> {
        let seats = SeatCount::new(seats)?;
        let profile = self
            .directory
            .find_user(passenger)
            .ok_or(LedgerError::UserNotFound(passenger))?;
        let cell_arc = self.ride_cell(ride_id)?;
        let now = self.clock.now();

        let (snapshot, event) = {
            let mut guard = lock(&cell_arc)?;
            let cell = &mut *guard;
            if cell.withdrawn {
                return Err(LedgerError::RideNotFound(ride_id));
            }
            if cell.inventory.has_departed(now) {
                return Err(LedgerError::RideDeparted(ride_id));
            }

            let record = BookingRecord::new(ride_id, passenger, seats, now);
            let event = BookingEvent {
                recipient: cell.inventory.driver(),
                kind: EventKind::BookingRequested,
                message: format!(
                    "New booking request: {} requested {seats} seat(s).",
                    profile.name
                ),
                ride_id,
                booking_id: record.id,
            };
            cell.bookings.insert(record.id, record.clone());
            (record, event)
        };

        self.booking_index.insert(snapshot.id, ride_id);
        self.emitter.emit(event);
        Ok(snapshot)
    }

    /// Accepts a pending booking, reserving its seats.
    ///
    /// Idempotent on an already-confirmed booking: the current record is
    /// returned unchanged, nothing is reserved twice and no event is
    /// re-emitted. Emits `BOOKING_ACCEPTED` to the passenger on the first
    /// acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BookingNotFound`],
    /// [`LedgerError::InsufficientCapacity`] (booking stays `Pending`), or
    /// [`LedgerError::InvalidTransition`] from a terminal state.
    pub fn accept_booking(&self, booking_id: BookingId) -> Result<BookingRecord, LedgerError> {
        let cell_arc = self.cell_for_booking(booking_id)?;
        let now = self.clock.now();

        let (snapshot, event) = {
            let mut guard = lock(&cell_arc)?;
            let cell = &mut *guard;
            if cell.withdrawn {
                return Err(LedgerError::BookingNotFound(booking_id));
            }
            let Some(record) = cell.bookings.get_mut(&booking_id) else {
                return Err(LedgerError::BookingNotFound(booking_id));
            };

            match record.state {
                BookingState::Confirmed => (record.clone(), None),
                BookingState::Pending => {
                    cell.inventory.reserve(record.seats)?;
                    record.transition(BookingState::Confirmed, now)?;
                    let event = BookingEvent {
                        recipient: record.passenger,
                        kind: EventKind::BookingAccepted,
                        message: format!(
                            "Your booking for {} to {} was accepted.",
                            cell.inventory.origin(),
                            cell.inventory.destination()
                        ),
                        ride_id: record.ride_id,
                        booking_id,
                    };
                    (record.clone(), Some(event))
                }
                state => {
                    return Err(LedgerError::InvalidTransition {
                        from: state,
                        attempted: BookingState::Confirmed,
                    });
                }
            }
        };

        if let Some(event) = event {
            self.emitter.emit(event);
        }
        Ok(snapshot)
    }

    /// Rejects a pending booking. No inventory mutation: nothing was
    /// reserved for a pending request.
    ///
    /// A confirmed booking cannot be rejected; it must be cancelled, which
    /// releases its seats. Emits `BOOKING_REJECTED` to the passenger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BookingNotFound`] or
    /// [`LedgerError::InvalidTransition`] when the booking is not pending.
    pub fn reject_booking(&self, booking_id: BookingId) -> Result<BookingRecord, LedgerError> {
        let cell_arc = self.cell_for_booking(booking_id)?;
        let now = self.clock.now();

        let (snapshot, event) = {
            let mut guard = lock(&cell_arc)?;
            let cell = &mut *guard;
            if cell.withdrawn {
                return Err(LedgerError::BookingNotFound(booking_id));
            }
            let Some(record) = cell.bookings.get_mut(&booking_id) else {
                return Err(LedgerError::BookingNotFound(booking_id));
            };

            match record.state {
                BookingState::Pending => {
                    record.transition(BookingState::Rejected, now)?;
                    let event = BookingEvent {
                        recipient: record.passenger,
                        kind: EventKind::BookingRejected,
                        message: format!(
                            "Your booking for {} to {} was rejected.",
                            cell.inventory.origin(),
                            cell.inventory.destination()
                        ),
                        ride_id: record.ride_id,
                        booking_id,
                    };
                    (record.clone(), event)
                }
                state => {
                    return Err(LedgerError::InvalidTransition {
                        from: state,
                        attempted: BookingState::Rejected,
                    });
                }
            }
        };

        self.emitter.emit(event);
        Ok(snapshot)
    }

    /// Cancels a pending or confirmed booking.
    ///
    /// Cancelling a confirmed booking releases its seats back to the ride's
    /// inventory before the transition; cancelling a pending one touches no
    /// inventory. Emits a driver-visible `BOOKING_CANCELLED` audit event.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BookingNotFound`] or
    /// [`LedgerError::InvalidTransition`] from a terminal state.
    pub fn cancel_booking(&self, booking_id: BookingId) -> Result<BookingRecord, LedgerError> {
        let cell_arc = self.cell_for_booking(booking_id)?;
        let now = self.clock.now();

        let (snapshot, event) = {
            let mut guard = lock(&cell_arc)?;
            let cell = &mut *guard;
            if cell.withdrawn {
                return Err(LedgerError::BookingNotFound(booking_id));
            }
            let Some(record) = cell.bookings.get_mut(&booking_id) else {
                return Err(LedgerError::BookingNotFound(booking_id));
            };

            match record.state {
                BookingState::Pending => {
                    record.transition(BookingState::Cancelled, now)?;
                }
                BookingState::Confirmed => {
                    if let Err(err) = cell.inventory.release(record.seats) {
                        error!(
                            booking_id = %booking_id,
                            error = %err,
                            "seat release failed during cancellation"
                        );
                        return Err(err);
                    }
                    record.transition(BookingState::Cancelled, now)?;
                }
                state => {
                    return Err(LedgerError::InvalidTransition {
                        from: state,
                        attempted: BookingState::Cancelled,
                    });
                }
            }

            let event = BookingEvent {
                recipient: cell.inventory.driver(),
                kind: EventKind::BookingCancelled,
                message: format!(
                    "A booking for {} seat(s) on {} to {} was cancelled.",
                    record.seats,
                    cell.inventory.origin(),
                    cell.inventory.destination()
                ),
                ride_id: record.ride_id,
                booking_id,
            };
            (record.clone(), event)
        };

        self.emitter.emit(event);
        Ok(snapshot)
    }

    /// Changes the seat count of a pending or confirmed booking.
    ///
    /// For a confirmed booking the inventory tracks the change: growing the
    /// booking re-reserves the delta (and fails whole if unavailable),
    /// shrinking it releases the difference. A pending booking holds no
    /// inventory, so only the record changes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BookingNotFound`],
    /// [`LedgerError::InsufficientCapacity`] (record unchanged), or
    /// [`LedgerError::InvalidTransition`] from a terminal state.
    pub fn update_booking_seats(
        &self,
        booking_id: BookingId,
        new_seats: SeatCount,
    ) -> Result<BookingRecord, LedgerError> {
        let cell_arc = self.cell_for_booking(booking_id)?;
        let now = self.clock.now();

        let snapshot = {
            let mut guard = lock(&cell_arc)?;
            let cell = &mut *guard;
            if cell.withdrawn {
                return Err(LedgerError::BookingNotFound(booking_id));
            }
            let Some(record) = cell.bookings.get_mut(&booking_id) else {
                return Err(LedgerError::BookingNotFound(booking_id));
            };

            match record.state {
                BookingState::Pending => {
                    record.seats = new_seats;
                    record.updated_at = now;
                }
                BookingState::Confirmed => {
                    let current = record.seats.get();
                    let wanted = new_seats.get();
                    if wanted > current {
                        let delta = SeatCount::new(wanted - current)?;
                        cell.inventory.reserve(delta)?;
                    } else if wanted < current {
                        let delta = SeatCount::new(current - wanted)?;
                        if let Err(err) = cell.inventory.release(delta) {
                            error!(
                                booking_id = %booking_id,
                                error = %err,
                                "seat release failed during booking update"
                            );
                            return Err(err);
                        }
                    }
                    record.seats = new_seats;
                    record.updated_at = now;
                }
                state => {
                    return Err(LedgerError::InvalidTransition {
                        from: state,
                        attempted: state,
                    });
                }
            }
            record.clone()
        };

        Ok(snapshot)
    }

    // ========================================================================
    // Read path (pure projection)
    // ========================================================================

    /// Snapshot of one ride's inventory
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RideNotFound`].
    pub fn ride(&self, ride_id: RideId) -> Result<RideInventory, LedgerError> {
        let cell_arc = self.ride_cell(ride_id)?;
        let guard = lock(&cell_arc)?;
        if guard.withdrawn {
            return Err(LedgerError::RideNotFound(ride_id));
        }
        Ok(guard.inventory.clone())
    }

    /// Snapshots of all published rides, ordered by departure time
    #[must_use]
    pub fn rides(&self) -> Vec<RideInventory> {
        let mut out: Vec<RideInventory> = self
            .rides
            .iter()
            .filter_map(|entry| {
                let guard = entry.value().lock().ok()?;
                (!guard.withdrawn).then(|| guard.inventory.clone())
            })
            .collect();
        out.sort_by_key(RideInventory::departure);
        out
    }

    /// Rides published by one driver, ordered by departure time
    #[must_use]
    pub fn rides_by_driver(&self, driver: UserId) -> Vec<RideInventory> {
        let mut out = self.rides();
        out.retain(|ride| ride.driver() == driver);
        out
    }

    /// Upcoming rides matching origin and destination (case-insensitive)
    /// and departing strictly after `departing_after`
    #[must_use]
    pub fn search_rides(
        &self,
        origin: &str,
        destination: &str,
        departing_after: DateTime<Utc>,
    ) -> Vec<RideInventory> {
        let mut out = self.rides();
        out.retain(|ride| {
            ride.origin().eq_ignore_ascii_case(origin)
                && ride.destination().eq_ignore_ascii_case(destination)
                && ride.departure() > departing_after
        });
        out
    }

    /// Snapshot of one booking
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BookingNotFound`].
    pub fn booking(&self, booking_id: BookingId) -> Result<BookingRecord, LedgerError> {
        let cell_arc = self.cell_for_booking(booking_id)?;
        let guard = lock(&cell_arc)?;
        if guard.withdrawn {
            return Err(LedgerError::BookingNotFound(booking_id));
        }
        guard
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or(LedgerError::BookingNotFound(booking_id))
    }

    /// Snapshots of every booking referencing a ride, oldest first
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RideNotFound`].
    pub fn bookings_for_ride(&self, ride_id: RideId) -> Result<Vec<BookingRecord>, LedgerError> {
        let cell_arc = self.ride_cell(ride_id)?;
        let guard = lock(&cell_arc)?;
        if guard.withdrawn {
            return Err(LedgerError::RideNotFound(ride_id));
        }
        let mut out: Vec<BookingRecord> = guard.bookings.values().cloned().collect();
        out.sort_by_key(|b| b.created_at);
        Ok(out)
    }

    /// Snapshots of every booking made by a passenger, oldest first
    #[must_use]
    pub fn bookings_for_passenger(&self, passenger: UserId) -> Vec<BookingRecord> {
        let mut out: Vec<BookingRecord> = self
            .rides
            .iter()
            .filter_map(|entry| {
                let guard = entry.value().lock().ok()?;
                if guard.withdrawn {
                    return None;
                }
                Some(
                    guard
                        .bookings
                        .values()
                        .filter(|b| b.passenger == passenger)
                        .cloned()
                        .collect::<Vec<_>>(),
                )
            })
            .flatten()
            .collect();
        out.sort_by_key(|b| b.created_at);
        out
    }

    // ========================================================================
    // Defensive auditing
    // ========================================================================

    /// Recomputes the seat-conservation invariant for one ride:
    /// `available + sum(seats of confirmed bookings) == capacity`.
    ///
    /// A violation means the ledger has a bug; it is logged at `error`
    /// level and returned as [`LedgerError::ConsistencyViolation`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RideNotFound`] or
    /// [`LedgerError::ConsistencyViolation`].
    pub fn audit_ride(&self, ride_id: RideId) -> Result<(), LedgerError> {
        let cell_arc = self.ride_cell(ride_id)?;
        let guard = lock(&cell_arc)?;
        if guard.withdrawn {
            return Err(LedgerError::RideNotFound(ride_id));
        }

        let confirmed: u64 = guard
            .bookings
            .values()
            .filter(|b| b.state == BookingState::Confirmed)
            .map(|b| u64::from(b.seats.get()))
            .sum();
        let available = u64::from(guard.inventory.available());
        let capacity = u64::from(guard.inventory.capacity());

        if confirmed + available == capacity {
            Ok(())
        } else {
            let detail = format!(
                "ride {ride_id}: available {available} + confirmed {confirmed} != capacity {capacity}"
            );
            error!(ride_id = %ride_id, "{detail}");
            Err(LedgerError::ConsistencyViolation(detail))
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ride_cell(&self, ride_id: RideId) -> Result<Arc<Mutex<RideCell>>, LedgerError> {
        self.rides
            .get(&ride_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::RideNotFound(ride_id))
    }

    fn cell_for_booking(&self, booking_id: BookingId) -> Result<Arc<Mutex<RideCell>>, LedgerError> {
        let ride_id = *self
            .booking_index
            .get(&booking_id)
            .ok_or(LedgerError::BookingNotFound(booking_id))?;
        // The index can briefly outlive the ride during withdrawal; a miss
        // here means the booking is gone with its ride.
        self.rides
            .get(&ride_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::BookingNotFound(booking_id))
    }
}

impl std::fmt::Debug for ReservationLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationLedger")
            .field("rides", &self.rides.len())
            .field("bookings", &self.booking_index.len())
            .finish_non_exhaustive()
    }
}
