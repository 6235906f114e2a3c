//! Search history domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infra::repositories::entities::search_history;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistory {
    pub id: i32,
    pub user_id: Uuid,
    pub keyword: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<search_history::Model> for SearchHistory {
    fn from(model: search_history::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            keyword: model.keyword,
            date: model.date,
            tags: model
                .tags
                .map(|tags| tags.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            created_at: model.created_at,
        }
    }
}
