//! Domain identifiers and request contexts.
//!
//! IDs are newtypes so a user id can never be passed where a contestant id is
//! expected. The context types are what the session gate hands to handlers in
//! place of ambient session lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a registered voter.
///
/// # Examples
///
/// ```rust
/// use ballotbox::domain::UserId;
///
/// let id = UserId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Unique identifier for a contestant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestantId(i32);

impl ContestantId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ContestantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ContestantId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<ContestantId> for i32 {
    fn from(id: ContestantId) -> Self {
        id.0
    }
}

/// An authenticated voter, as established by the session gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: UserId,
    pub username: String,
}

/// An authenticated administrator, as established by the session gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminContext {
    pub admin_id: i32,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_conversions() {
        let id = UserId::new(7);
        assert_eq!(id.value(), 7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(UserId::from(7), id);
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&ContestantId::new(3)).unwrap(), "3");
        let id: UserId = serde_json::from_str("11").unwrap();
        assert_eq!(id, UserId::new(11));
    }
}
