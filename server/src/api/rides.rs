//! Ride management API endpoints.
//!
//! - POST `/api/rides/driver/:driver_id` - publish a ride
//! - GET `/api/rides` - list published rides
//! - GET `/api/rides/search` - search by origin/destination
//! - GET `/api/rides/:id` - ride snapshot
//! - GET `/api/rides/driver/:driver_id` - rides published by a driver
//! - DELETE `/api/rides/:id` - withdraw a ride (only without active bookings)

use crate::error::AppError;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use ridepool_core::{Money, RideId, RideInventory, RideSpec, SeatCount, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to publish a ride.
#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    /// Where the ride departs from
    pub origin: String,
    /// Where the ride goes
    pub destination: String,
    /// Scheduled departure time
    pub departure: DateTime<Utc>,
    /// Total seat capacity
    pub capacity: u32,
    /// Price per seat, in cents
    pub price_per_seat_cents: u64,
}

/// Ride snapshot returned by every ride endpoint.
#[derive(Debug, Serialize)]
pub struct RideResponse {
    /// Ride ID
    pub id: Uuid,
    /// Driver who published the ride
    pub driver_id: Uuid,
    /// Origin
    pub origin: String,
    /// Destination
    pub destination: String,
    /// Departure time
    pub departure: DateTime<Utc>,
    /// Total seat capacity
    pub capacity: u32,
    /// Seats currently available
    pub available: u32,
    /// Price per seat, in cents
    pub price_per_seat_cents: u64,
}

impl From<RideInventory> for RideResponse {
    fn from(ride: RideInventory) -> Self {
        Self {
            id: *ride.id().as_uuid(),
            driver_id: *ride.driver().as_uuid(),
            origin: ride.origin().to_string(),
            destination: ride.destination().to_string(),
            departure: ride.departure(),
            capacity: ride.capacity(),
            available: ride.available(),
            price_per_seat_cents: ride.price_per_seat().cents(),
        }
    }
}

/// Query parameters for ride search.
#[derive(Debug, Deserialize)]
pub struct SearchRidesQuery {
    /// Origin to match (case-insensitive)
    pub origin: String,
    /// Destination to match (case-insensitive)
    pub destination: String,
    /// Only rides departing strictly after this instant (default: now)
    pub departing_after: Option<DateTime<Utc>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Publish a new ride for a driver.
///
/// # Errors
///
/// Returns `422` for a zero capacity and `404` for an unknown driver.
pub async fn create_ride(
    Path(driver_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<RideResponse>), AppError> {
    let capacity = SeatCount::new(request.capacity)
        .map_err(|_| AppError::validation("Capacity must be greater than zero"))?;

    let spec = RideSpec {
        origin: request.origin,
        destination: request.destination,
        departure: request.departure,
        capacity,
        price_per_seat: Money::from_cents(request.price_per_seat_cents),
    };
    let ride = state
        .ledger
        .publish_ride(UserId::from_uuid(driver_id), spec)?;
    Ok((StatusCode::CREATED, Json(ride.into())))
}

/// Get a ride snapshot by id.
///
/// # Errors
///
/// Returns `404` for a missing or withdrawn ride.
pub async fn get_ride(
    Path(ride_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RideResponse>, AppError> {
    let ride = state.ledger.ride(RideId::from_uuid(ride_id))?;
    Ok(Json(ride.into()))
}

/// List all published rides, ordered by departure time.
pub async fn list_rides(State(state): State<AppState>) -> Json<Vec<RideResponse>> {
    Json(state.ledger.rides().into_iter().map(Into::into).collect())
}

/// Search upcoming rides by origin and destination.
pub async fn search_rides(
    State(state): State<AppState>,
    Query(query): Query<SearchRidesQuery>,
) -> Json<Vec<RideResponse>> {
    let after = query.departing_after.unwrap_or_else(Utc::now);
    Json(
        state
            .ledger
            .search_rides(&query.origin, &query.destination, after)
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

/// List rides published by a driver.
pub async fn rides_by_driver(
    Path(driver_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Json<Vec<RideResponse>> {
    Json(
        state
            .ledger
            .rides_by_driver(UserId::from_uuid(driver_id))
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

/// Withdraw a ride.
///
/// # Errors
///
/// Returns `404` for a missing ride and `409` while any booking on it is
/// still pending or confirmed.
pub async fn withdraw_ride(
    Path(ride_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.ledger.withdraw_ride(RideId::from_uuid(ride_id))?;
    Ok(StatusCode::NO_CONTENT)
}
