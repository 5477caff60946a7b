//! Ridepool HTTP server.
//!
//! Exposes the seat-reservation ledger from `ridepool-core` over a JSON
//! API. The server owns the ambient plumbing: configuration, error
//! mapping to HTTP statuses, the notification store, and the Axum router.
//!
//! # Architecture
//!
//! ```text
//! HTTP request
//!     │
//!     ▼
//! api handlers (thin: decode, validate, delegate)
//!     │
//!     ▼
//! ReservationLedger (ridepool-core, all domain rules)
//!     │
//!     └──► BookingEvent channel ──► NotificationStore (drain task)
//! ```
//!
//! Handlers never touch ride or booking state directly; every mutation
//! goes through the ledger so the capacity invariant holds regardless of
//! which endpoint triggered it.

pub mod api;
pub mod config;
pub mod error;
pub mod notifications;
pub mod server;

pub use config::Config;
pub use error::AppError;
pub use notifications::{Notification, NotificationId, NotificationStore};
pub use server::{build_router, AppState};
