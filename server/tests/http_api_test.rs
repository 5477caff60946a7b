//! End-to-end HTTP tests for the Ridepool API.
//!
//! Each test boots an in-process server with a fresh ledger and drives it
//! through the public JSON API only.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum_test::TestServer;
use chrono::{Duration, Utc};
use ridepool_core::{ChannelEmitter, InMemoryDirectory, ReservationLedger, SystemClock};
use ridepool_server::config::{BookingConfig, Config, ServerConfig};
use ridepool_server::notifications::{drain, NotificationStore};
use ridepool_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            log_level: "info".into(),
        },
        booking: BookingConfig {
            max_seats_per_booking: 8,
        },
    }
}

/// Boot a server with a fresh ledger and a running notification drain task.
fn test_server() -> TestServer {
    let clock = Arc::new(SystemClock);
    let directory = Arc::new(InMemoryDirectory::new());
    let (emitter, rx) = ChannelEmitter::channel();
    let ledger = Arc::new(ReservationLedger::new(
        directory.clone(),
        Arc::new(emitter),
        clock.clone(),
    ));
    let notifications = Arc::new(NotificationStore::new());
    tokio::spawn(drain(rx, notifications.clone(), clock));

    let state = AppState::new(ledger, directory, notifications, Arc::new(test_config()));
    TestServer::new(build_router(state)).unwrap()
}

async fn register_user(server: &TestServer, name: &str) -> Uuid {
    let response = server.post("/api/users").json(&json!({ "name": name })).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

async fn publish_ride(server: &TestServer, driver: Uuid, capacity: u32) -> Uuid {
    let response = server
        .post(&format!("/api/rides/driver/{driver}"))
        .json(&json!({
            "origin": "Lyon",
            "destination": "Paris",
            "departure": Utc::now() + Duration::days(1),
            "capacity": capacity,
            "price_per_seat_cents": 2500,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

async fn request_booking(server: &TestServer, ride: Uuid, passenger: Uuid, seats: u32) -> Uuid {
    let response = server
        .post("/api/bookings")
        .json(&json!({
            "ride_id": ride,
            "passenger_id": passenger,
            "seats": seats,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

async fn available_seats(server: &TestServer, ride: Uuid) -> u64 {
    server
        .get(&format!("/api/rides/{ride}"))
        .await
        .json::<Value>()["available"]
        .as_u64()
        .unwrap()
}

/// Notifications are delivered through a channel, so poll until the drain
/// task has caught up.
async fn wait_for_unread(server: &TestServer, user: Uuid, expected: u64) {
    for _ in 0..100 {
        let unread = server
            .get(&format!("/api/notifications/user/{user}/unread-count"))
            .await
            .json::<Value>()["unread"]
            .as_u64()
            .unwrap();
        if unread == expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("user {user} never reached {expected} unread notifications");
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_endpoints_respond() {
    let server = test_server();

    server.get("/health").await.assert_json(&json!({"status": "ok"}));
    server.get("/ready").await.assert_json(&json!({"status": "ready"}));
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn register_and_fetch_user() {
    let server = test_server();

    let id = register_user(&server, "Alice").await;
    let response = server.get(&format!("/api/users/{id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Alice");

    server
        .get(&format!("/api/users/{}", Uuid::new_v4()))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn blank_user_name_is_rejected() {
    let server = test_server();

    let response = server.post("/api/users").json(&json!({ "name": "   " })).await;
    response.assert_status_bad_request();
}

// ============================================================================
// Rides
// ============================================================================

#[tokio::test]
async fn publish_and_search_rides() {
    let server = test_server();
    let driver = register_user(&server, "Dave").await;
    let ride = publish_ride(&server, driver, 3).await;

    let snapshot = server.get(&format!("/api/rides/{ride}")).await.json::<Value>();
    assert_eq!(snapshot["capacity"], 3);
    assert_eq!(snapshot["available"], 3);
    assert_eq!(snapshot["origin"], "Lyon");

    // Search is case-insensitive
    let found = server
        .get("/api/rides/search?origin=lyon&destination=PARIS")
        .await
        .json::<Value>();
    assert_eq!(found.as_array().unwrap().len(), 1);

    let none = server
        .get("/api/rides/search?origin=Lyon&destination=Marseille")
        .await
        .json::<Value>();
    assert!(none.as_array().unwrap().is_empty());

    let by_driver = server
        .get(&format!("/api/rides/driver/{driver}"))
        .await
        .json::<Value>();
    assert_eq!(by_driver.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn publishing_requires_known_driver_and_positive_capacity() {
    let server = test_server();

    let response = server
        .post(&format!("/api/rides/driver/{}", Uuid::new_v4()))
        .json(&json!({
            "origin": "Lyon",
            "destination": "Paris",
            "departure": Utc::now() + Duration::days(1),
            "capacity": 3,
            "price_per_seat_cents": 2500,
        }))
        .await;
    response.assert_status_not_found();

    let driver = register_user(&server, "Dave").await;
    let response = server
        .post(&format!("/api/rides/driver/{driver}"))
        .json(&json!({
            "origin": "Lyon",
            "destination": "Paris",
            "departure": Utc::now() + Duration::days(1),
            "capacity": 0,
            "price_per_seat_cents": 2500,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Booking lifecycle
// ============================================================================

#[tokio::test]
async fn full_booking_flow_over_http() {
    let server = test_server();
    let driver = register_user(&server, "Dave").await;
    let passenger = register_user(&server, "Pia").await;
    let ride = publish_ride(&server, driver, 3).await;

    // Requesting holds nothing
    let booking = request_booking(&server, ride, passenger, 2).await;
    assert_eq!(available_seats(&server, ride).await, 3);
    let snapshot = server
        .get(&format!("/api/bookings/{booking}"))
        .await
        .json::<Value>();
    assert_eq!(snapshot["status"], "PENDING");

    // Accepting reserves
    let response = server.put(&format!("/api/bookings/{booking}/accept")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "CONFIRMED");
    assert_eq!(available_seats(&server, ride).await, 1);

    // Accept is idempotent
    server
        .put(&format!("/api/bookings/{booking}/accept"))
        .await
        .assert_status_ok();
    assert_eq!(available_seats(&server, ride).await, 1);

    // Shrinking a confirmed booking releases the difference
    let response = server
        .put(&format!("/api/bookings/{booking}"))
        .json(&json!({ "seats": 1 }))
        .await;
    response.assert_status_ok();
    assert_eq!(available_seats(&server, ride).await, 2);

    // Cancelling returns the rest
    let response = server.delete(&format!("/api/bookings/{booking}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "CANCELLED");
    assert_eq!(available_seats(&server, ride).await, 3);
}

#[tokio::test]
async fn booking_error_statuses() {
    let server = test_server();
    let driver = register_user(&server, "Dave").await;
    let passenger = register_user(&server, "Pia").await;
    let ride = publish_ride(&server, driver, 2).await;

    // Unknown ride
    server
        .post("/api/bookings")
        .json(&json!({
            "ride_id": Uuid::new_v4(),
            "passenger_id": passenger,
            "seats": 1,
        }))
        .await
        .assert_status_not_found();

    // Zero seats
    server
        .post("/api/bookings")
        .json(&json!({ "ride_id": ride, "passenger_id": passenger, "seats": 0 }))
        .await
        .assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    // Over the per-booking limit
    server
        .post("/api/bookings")
        .json(&json!({ "ride_id": ride, "passenger_id": passenger, "seats": 9 }))
        .await
        .assert_status_bad_request();

    // Rejecting a confirmed booking conflicts
    let booking = request_booking(&server, ride, passenger, 2).await;
    server
        .put(&format!("/api/bookings/{booking}/accept"))
        .await
        .assert_status_ok();
    server
        .put(&format!("/api/bookings/{booking}/reject"))
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);

    // Inventory is exhausted for a second passenger
    let rival = register_user(&server, "Rex").await;
    let rival_booking = request_booking(&server, ride, rival, 1).await;
    let response = server
        .put(&format!("/api/bookings/{rival_booking}/accept"))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "CONFLICT");
}

#[tokio::test]
async fn withdraw_ride_respects_active_bookings() {
    let server = test_server();
    let driver = register_user(&server, "Dave").await;
    let passenger = register_user(&server, "Pia").await;
    let ride = publish_ride(&server, driver, 2).await;
    let booking = request_booking(&server, ride, passenger, 1).await;

    server
        .delete(&format!("/api/rides/{ride}"))
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);

    server
        .delete(&format!("/api/bookings/{booking}"))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/api/rides/{ride}"))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/rides/{ride}"))
        .await
        .assert_status_not_found();
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn notification_feed_follows_the_booking_lifecycle() {
    let server = test_server();
    let driver = register_user(&server, "Dave").await;
    let passenger = register_user(&server, "Pia").await;
    let ride = publish_ride(&server, driver, 2).await;

    // Requesting notifies the driver
    let booking = request_booking(&server, ride, passenger, 1).await;
    wait_for_unread(&server, driver, 1).await;

    // Accepting notifies the passenger
    server
        .put(&format!("/api/bookings/{booking}/accept"))
        .await
        .assert_status_ok();
    wait_for_unread(&server, passenger, 1).await;

    let feed = server
        .get(&format!("/api/notifications/user/{passenger}"))
        .await
        .json::<Value>();
    let entries = feed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "BOOKING_ACCEPTED");
    assert_eq!(entries[0]["read"], false);

    // Mark a single entry read
    let notification_id = entries[0]["id"].as_str().unwrap();
    server
        .put(&format!("/api/notifications/{notification_id}/read"))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    wait_for_unread(&server, passenger, 0).await;

    // Cancelling notifies the driver again; read-all clears the feed
    server
        .delete(&format!("/api/bookings/{booking}"))
        .await
        .assert_status_ok();
    wait_for_unread(&server, driver, 2).await;
    let response = server
        .put(&format!("/api/notifications/user/{driver}/read-all"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["updated"], 2);
    wait_for_unread(&server, driver, 0).await;

    // Unknown notification ids are 404
    server
        .put(&format!("/api/notifications/{}/read", Uuid::new_v4()))
        .await
        .assert_status_not_found();
}
