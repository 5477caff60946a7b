//! Application state for the Ridepool HTTP server.
//!
//! Contains the shared resources handlers need: the reservation ledger,
//! the user directory, the notification store, and the loaded config.

use crate::config::Config;
use crate::notifications::NotificationStore;
use ridepool_core::{InMemoryDirectory, ReservationLedger};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// The reservation ledger: the only mutation path for rides and
    /// bookings
    pub ledger: Arc<ReservationLedger>,
    /// User directory, shared with the ledger for identity lookups
    pub directory: Arc<InMemoryDirectory>,
    /// Notification store fed by the ledger's event stream
    pub notifications: Arc<NotificationStore>,
    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(
        ledger: Arc<ReservationLedger>,
        directory: Arc<InMemoryDirectory>,
        notifications: Arc<NotificationStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            ledger,
            directory,
            notifications,
            config,
        }
    }
}
