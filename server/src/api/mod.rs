//! HTTP API endpoints for the Ridepool marketplace.
//!
//! Handlers are a thin imperative shell: parse the request, call the
//! reservation ledger (or a read path), map the typed result to JSON.
//! Authorization (driver-only, passenger-only) is assumed to be enforced
//! by the deployment's gateway in front of this service; the handlers only
//! validate the request shape and policy limits.

pub mod bookings;
pub mod notifications;
pub mod rides;
pub mod users;
