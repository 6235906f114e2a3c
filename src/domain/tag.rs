//! Tag domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infra::repositories::entities::tag;

/// Default tag type for tags created without one
pub const DEFAULT_TAG_KIND: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub click_count: i32,
}

impl Tag {
    /// Whether this tag has the requested text
    pub fn matches(&self, text: &str) -> bool {
        self.text == text
    }
}

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            kind: model.kind,
            click_count: model.tag_click_count,
        }
    }
}

/// Tag as supplied by an import or a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub text: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    DEFAULT_TAG_KIND.to_string()
}

impl NewTag {
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
        }
    }

    pub(crate) fn into_model(self, now: DateTime<Utc>) -> tag::Model {
        tag::Model {
            id: Uuid::new_v4(),
            text: self.text,
            kind: self.kind,
            tag_click_count: 0,
            created_at: now,
            modified_at: now,
        }
    }
}
