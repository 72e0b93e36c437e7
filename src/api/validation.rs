//! Request-shape checks that run before a service is called.
//!
//! Failures are messages for a danger notice.

use crate::domain::{ContestantId, UserId};

/// Longest value a short text column accepts.
pub const MAX_FIELD_LEN: usize = 255;

pub fn validate_contestant_id(id: i32) -> Result<ContestantId, String> {
    if id <= 0 {
        return Err(format!("Invalid contestant ID: {id}."));
    }
    Ok(ContestantId::new(id))
}

pub fn validate_user_id(id: i32) -> Result<UserId, String> {
    if id <= 0 {
        return Err(format!("Invalid user ID: {id}."));
    }
    Ok(UserId::new(id))
}

pub fn validate_field_length<'a>(label: &str, value: &'a str) -> Result<&'a str, String> {
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(format!(
            "{label} must be {MAX_FIELD_LEN} characters or less."
        ));
    }
    Ok(value)
}
