//! User domain entity and activity status values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{STATUS_COMPLETED, STATUS_REGISTERED, STATUS_WISH, VALID_STATUSES};
use crate::errors::AppError;
use crate::infra::repositories::entities::user;

/// Relationship of a user to an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Wish,
    Registered,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Wish => STATUS_WISH,
            ActivityStatus::Registered => STATUS_REGISTERED,
            ActivityStatus::Completed => STATUS_COMPLETED,
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            STATUS_WISH => Ok(ActivityStatus::Wish),
            STATUS_REGISTERED => Ok(ActivityStatus::Registered),
            STATUS_COMPLETED => Ok(ActivityStatus::Completed),
            _ => Err(AppError::validation(format!(
                "Invalid status '{}', expected one of: {}",
                s,
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            nick_name: model.nick_name,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("Wish".parse::<ActivityStatus>().unwrap(), ActivityStatus::Wish);
        assert_eq!(" completed ".parse::<ActivityStatus>().unwrap(), ActivityStatus::Completed);
        assert!(matches!(
            "archived".parse::<ActivityStatus>(),
            Err(AppError::Validation(_))
        ));
    }
}
