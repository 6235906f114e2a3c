//! Activity domain entity and its sortable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::branch::{Branch, NewBranch};
use super::tag::{NewTag, Tag};
use crate::infra::repositories::entities::activity;
use crate::query::{SortField, SortValue, Sortable};

/// Status of an activity for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMark {
    pub status: String,
    /// Time of the last status change
    pub changed_at: DateTime<Utc>,
}

/// Activity domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub content: String,
    pub activity_clicked_count: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Viewer's status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusMark>,
}

impl Activity {
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_branches(mut self, branches: Vec<Branch>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_status(mut self, status: StatusMark) -> Self {
        self.status = Some(status);
        self
    }

    /// Number of this activity's tags whose text is in `requested`
    pub fn tag_overlap(&self, requested: &[String]) -> usize {
        self.tags
            .iter()
            .filter(|tag| requested.iter().any(|text| tag.matches(text)))
            .count()
    }

    /// Status-change time on managed lists, creation time otherwise
    pub fn added_at(&self) -> DateTime<Utc> {
        self.status
            .as_ref()
            .map_or(self.created_at, |mark| mark.changed_at)
    }
}

impl From<activity::Model> for Activity {
    fn from(model: activity::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            subtitle: model.subtitle,
            content: model.content,
            activity_clicked_count: model.activity_clicked_count,
            created_at: model.created_at,
            modified_at: model.modified_at,
            tags: Vec::new(),
            branches: Vec::new(),
            status: None,
        }
    }
}

impl Sortable for Activity {
    const ENTITY: &'static str = "Activity";

    fn sort_fields() -> &'static [SortField<Self>] {
        const FIELDS: &[SortField<Activity>] = &[
            SortField {
                name: "Id",
                key: |a| SortValue::from(a.id),
            },
            SortField {
                name: "Title",
                key: |a| SortValue::from(&a.title),
            },
            SortField {
                name: "Subtitle",
                key: |a| SortValue::from(a.subtitle.as_deref()),
            },
            SortField {
                name: "Content",
                key: |a| SortValue::from(&a.content),
            },
            SortField {
                name: "ActivityClickedCount",
                key: |a| SortValue::from(a.activity_clicked_count),
            },
            SortField {
                name: "CreatedAt",
                key: |a| SortValue::from(a.created_at),
            },
            SortField {
                name: "ModifiedAt",
                key: |a| SortValue::from(a.modified_at),
            },
        ];
        FIELDS
    }

    fn natural_key(&self) -> SortValue {
        SortValue::from(self.id)
    }
}

/// Activity as supplied by a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<NewTag>,
    #[serde(default)]
    pub branches: Vec<NewBranch>,
}

impl NewActivity {
    pub(crate) fn to_model(&self, now: DateTime<Utc>) -> activity::Model {
        activity::Model {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            content: self.content.clone(),
            activity_clicked_count: 0,
            created_at: now,
            modified_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity() -> Activity {
        let now = Utc::now();
        Activity {
            id: Uuid::new_v4(),
            title: "Pottery".into(),
            subtitle: None,
            content: "Wheel throwing".into(),
            activity_clicked_count: 3,
            created_at: now,
            modified_at: now,
            tags: vec![
                Tag {
                    id: Uuid::new_v4(),
                    text: "Art".into(),
                    kind: "general".into(),
                    click_count: 0,
                },
                Tag {
                    id: Uuid::new_v4(),
                    text: "Indoor".into(),
                    kind: "general".into(),
                    click_count: 0,
                },
            ],
            branches: Vec::new(),
            status: None,
        }
    }

    #[test]
    fn test_tag_overlap_counts_matching_texts() {
        let requested = vec!["Art".to_string(), "Outdoor".to_string(), "art".to_string()];

        assert_eq!(activity().tag_overlap(&requested), 1);
    }

    #[test]
    fn test_added_at_prefers_status_change() {
        let changed_at = Utc::now() + chrono::Duration::days(1);
        let marked = activity().with_status(StatusMark {
            status: "wish".into(),
            changed_at,
        });

        assert_eq!(marked.added_at(), changed_at);
    }

    #[test]
    fn test_snake_case_sort_key_resolves() {
        let selector = Activity::resolve_sort_key("activity_clicked_count").unwrap();

        assert_eq!(selector.extract(&activity()), SortValue::Int(3));
    }
}
