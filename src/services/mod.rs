//! Application services layer - Use cases and business logic.
//!
//! Services compose repository calls and the query engine. Each one holds
//! the request's unit of work; services created from the same unit of work
//! share its repositories and pending changes.

mod activity_service;
mod branch_service;
mod comment_service;
mod tag_service;
mod user_service;

use serde::Serialize;

pub use activity_service::{ActivityManager, ActivityService};
pub use branch_service::{BranchManager, BranchService};
pub use comment_service::{CommentManager, CommentService};
pub use tag_service::{TagManager, TagService};
pub use user_service::{UserManager, UserService};

use crate::config::VALID_STATUSES;

/// Values a client may use in list filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValues {
    pub activity_sort_keys: Vec<&'static str>,
    pub comment_sort_keys: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
}

pub fn filter_values() -> FilterValues {
    FilterValues {
        activity_sort_keys: ActivityManager::sort_keys(),
        comment_sort_keys: CommentManager::sort_keys(),
        statuses: VALID_STATUSES.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_values_list_semantic_keys_first() {
        let values = filter_values();

        assert_eq!(&values.activity_sort_keys[..2], &["Trend", "AddTime"]);
        assert!(values.activity_sort_keys.contains(&"CreatedAt"));
        assert_eq!(values.statuses, vec!["wish", "registered", "completed"]);
    }
}
