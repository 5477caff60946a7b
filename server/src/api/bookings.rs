//! Booking lifecycle API endpoints.
//!
//! - POST `/api/bookings` - request a booking (passenger)
//! - GET `/api/bookings/:id` - booking snapshot
//! - GET `/api/bookings/ride/:ride_id` - bookings on a ride
//! - GET `/api/bookings/passenger/:passenger_id` - a passenger's bookings
//! - PUT `/api/bookings/:id` - change the requested seat count
//! - PUT `/api/bookings/:id/accept` - driver accepts (reserves seats)
//! - PUT `/api/bookings/:id/reject` - driver rejects a pending booking
//! - DELETE `/api/bookings/:id` - cancel (releases seats if confirmed)
//!
//! # State Machine
//!
//! ```text
//! PENDING ──accept──→ CONFIRMED ──cancel──→ CANCELLED
//!    │
//!    ├──reject──→ REJECTED
//!    └──cancel──→ CANCELLED
//! ```

use crate::error::AppError;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use ridepool_core::{BookingId, BookingRecord, BookingState, RideId, SeatCount, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Ride to book seats on
    pub ride_id: Uuid,
    /// Passenger making the request
    pub passenger_id: Uuid,
    /// Number of seats requested
    pub seats: u32,
}

/// Request to change a booking's seat count.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    /// New seat count
    pub seats: u32,
}

/// Booking snapshot returned by every booking endpoint.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking ID
    pub id: Uuid,
    /// Ride the booking references
    pub ride_id: Uuid,
    /// Passenger who made the request
    pub passenger_id: Uuid,
    /// Requested seat count
    pub seats: u32,
    /// Current lifecycle state
    pub status: BookingState,
    /// When the booking was requested
    pub created_at: DateTime<Utc>,
    /// When the booking last changed
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRecord> for BookingResponse {
    fn from(booking: BookingRecord) -> Self {
        Self {
            id: *booking.id.as_uuid(),
            ride_id: *booking.ride_id.as_uuid(),
            passenger_id: *booking.passenger.as_uuid(),
            seats: booking.seats.get(),
            status: booking.state,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Request a booking. The booking starts `PENDING` and holds no seats
/// until the driver accepts it.
///
/// # Errors
///
/// Returns `400` when the seat count exceeds the configured per-booking
/// limit, `422` for zero seats, `404` for an unknown ride or passenger,
/// and `409` once the ride has departed.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let max = state.config.booking.max_seats_per_booking;
    if request.seats > max {
        return Err(AppError::bad_request(format!(
            "Cannot request more than {max} seats in one booking"
        )));
    }

    let booking = state.ledger.request_booking(
        RideId::from_uuid(request.ride_id),
        UserId::from_uuid(request.passenger_id),
        request.seats,
    )?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Get a booking snapshot by id.
///
/// # Errors
///
/// Returns `404` for an unknown booking.
pub async fn get_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.ledger.booking(BookingId::from_uuid(booking_id))?;
    Ok(Json(booking.into()))
}

/// List bookings referencing a ride, oldest first.
///
/// # Errors
///
/// Returns `404` for an unknown ride.
pub async fn bookings_for_ride(
    Path(ride_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.ledger.bookings_for_ride(RideId::from_uuid(ride_id))?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// List a passenger's bookings, oldest first.
pub async fn bookings_for_passenger(
    Path(passenger_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Json<Vec<BookingResponse>> {
    Json(
        state
            .ledger
            .bookings_for_passenger(UserId::from_uuid(passenger_id))
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

/// Accept a pending booking, reserving its seats. Idempotent on an
/// already-confirmed booking.
///
/// # Errors
///
/// Returns `404` for an unknown booking and `409` when the inventory
/// cannot satisfy the reservation or the booking is terminal.
pub async fn accept_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .ledger
        .accept_booking(BookingId::from_uuid(booking_id))?;
    Ok(Json(booking.into()))
}

/// Reject a pending booking. A confirmed booking cannot be rejected; it
/// must be cancelled instead.
///
/// # Errors
///
/// Returns `404` for an unknown booking and `409` when the booking is not
/// pending.
pub async fn reject_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .ledger
        .reject_booking(BookingId::from_uuid(booking_id))?;
    Ok(Json(booking.into()))
}

/// Cancel a pending or confirmed booking, releasing reserved seats when
/// the booking was confirmed.
///
/// # Errors
///
/// Returns `404` for an unknown booking and `409` from a terminal state.
pub async fn cancel_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .ledger
        .cancel_booking(BookingId::from_uuid(booking_id))?;
    Ok(Json(booking.into()))
}

/// Change the seat count of a pending or confirmed booking.
///
/// # Errors
///
/// Returns `400` over the per-booking limit, `422` for zero seats, `404`
/// for an unknown booking, and `409` when a confirmed booking cannot grow
/// into the remaining inventory or the booking is terminal.
pub async fn update_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let max = state.config.booking.max_seats_per_booking;
    if request.seats > max {
        return Err(AppError::bad_request(format!(
            "Cannot request more than {max} seats in one booking"
        )));
    }

    let seats = SeatCount::new(request.seats)?;
    let booking = state
        .ledger
        .update_booking_seats(BookingId::from_uuid(booking_id), seats)?;
    Ok(Json(booking.into()))
}
