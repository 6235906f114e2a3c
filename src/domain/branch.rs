//! Activity branches and the locations they are held at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infra::repositories::entities::{branch, location};

/// One offering of an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub branch_name: String,
    /// Location contents, ordered
    #[serde(rename = "location")]
    pub locations: Vec<String>,
}

impl Branch {
    pub(crate) fn from_model(model: branch::Model, mut locations: Vec<String>) -> Self {
        locations.sort();
        Self {
            id: model.id,
            branch_name: model.branch_name,
            locations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub content: String,
}

impl From<location::Model> for Location {
    fn from(model: location::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
        }
    }
}

/// Branch as supplied by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBranch {
    pub branch_name: String,
    #[serde(rename = "location", default)]
    pub locations: Vec<String>,
}

impl NewBranch {
    pub fn new<I, S>(branch_name: impl Into<String>, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branch_name: branch_name.into(),
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }

    /// Location contents, trimmed, blanks and duplicates removed
    pub fn location_contents(&self) -> Vec<&str> {
        let mut contents: Vec<&str> = Vec::new();
        for content in self.locations.iter().map(|l| l.trim()) {
            if !content.is_empty() && !contents.contains(&content) {
                contents.push(content);
            }
        }
        contents
    }

    pub(crate) fn to_model(&self, activity_id: Uuid, now: DateTime<Utc>) -> branch::Model {
        branch::Model {
            id: Uuid::new_v4(),
            activity_id,
            branch_name: self.branch_name.trim().to_string(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// Location row for a content not stored yet
pub(crate) fn new_location(content: &str, now: DateTime<Utc>) -> location::Model {
    location::Model {
        id: Uuid::new_v4(),
        content: content.to_string(),
        created_at: now,
        modified_at: now,
    }
}
