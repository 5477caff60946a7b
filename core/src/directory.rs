//! User directory: the ledger's view of the identity collaborator.
//!
//! The ledger only needs to know whether a driver or passenger exists (and
//! a display name for notification messages). Registration, credentials and
//! role checks live in the surrounding system; callers are expected to have
//! authorized the operation before invoking the ledger.

use crate::types::UserId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Minimal identity snapshot the ledger consumes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identity
    pub id: UserId,
    /// Display name used in notification messages
    pub name: String,
}

/// Fallible identity lookup, treated as an external collaborator.
pub trait UserDirectory: Send + Sync {
    /// Resolves a user, returning `None` on miss
    fn find_user(&self, id: UserId) -> Option<UserProfile>;
}

/// In-process directory backed by a concurrent map.
///
/// Serves as the production directory for a single-node deployment and as
/// the test double everywhere else.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, UserProfile>,
}

impl InMemoryDirectory {
    /// Creates an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new user under a fresh id and returns the profile
    pub fn register(&self, name: impl Into<String>) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(),
            name: name.into(),
        };
        self.users.insert(profile.id, profile.clone());
        profile
    }

    /// Inserts a profile with a caller-chosen id, replacing any previous one
    pub fn insert(&self, profile: UserProfile) {
        self.users.insert(profile.id, profile);
    }
}

impl UserDirectory for InMemoryDirectory {
    fn find_user(&self, id: UserId) -> Option<UserProfile> {
        self.users.get(&id).map(|entry| entry.clone())
    }
}
