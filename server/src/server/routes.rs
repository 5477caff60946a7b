//! Router configuration for the Ridepool server.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{bookings, notifications, rides, users};
use axum::{
    routing::{get, post, put},
    Router,
};

/// Build the complete Axum router.
///
/// Configures health checks plus the user, ride, booking, and
/// notification endpoints under `/api`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Identity plumbing
        .route("/users", post(users::register_user))
        .route("/users/:id", get(users::get_user))
        // Ride management
        .route("/rides", get(rides::list_rides))
        .route("/rides/search", get(rides::search_rides))
        .route(
            "/rides/driver/:driver_id",
            post(rides::create_ride).get(rides::rides_by_driver),
        )
        .route(
            "/rides/:id",
            get(rides::get_ride).delete(rides::withdraw_ride),
        )
        // Booking lifecycle
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/ride/:ride_id", get(bookings::bookings_for_ride))
        .route(
            "/bookings/passenger/:passenger_id",
            get(bookings::bookings_for_passenger),
        )
        .route(
            "/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::cancel_booking),
        )
        .route("/bookings/:id/accept", put(bookings::accept_booking))
        .route("/bookings/:id/reject", put(bookings::reject_booking))
        // Notification feed
        .route(
            "/notifications/user/:user_id",
            get(notifications::list_user_notifications),
        )
        .route(
            "/notifications/user/:user_id/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/notifications/user/:user_id/read-all",
            put(notifications::mark_all_read),
        )
        .route("/notifications/:id/read", put(notifications::mark_read));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
