//! Comment domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infra::repositories::entities::comment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub rate: i32,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<comment::Model> for Comment {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            activity_id: model.activity_id,
            user_id: model.user_id,
            content: model.content,
            rate: model.rate,
            sequence: model.sequence,
            created_at: model.created_at,
            modified_at: model.modified_at,
        }
    }
}

/// Comment posted by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub rate: i32,
}
