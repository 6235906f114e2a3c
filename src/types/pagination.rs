//! Pagination types for list operations.
//!
//! Every list (activities, managed activities, trending, comments, search
//! history) accepts a [`SegmentRequest`] and answers with a
//! [`SegmentResponse`].

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{DEFAULT_COUNT_PER_PAGE, DEFAULT_PAGE_NUMBER, DEFAULT_SORT_KEY};
use crate::domain::Comment;
use crate::errors::{AppError, AppResult};
use crate::query::{Direction, Page, PageSpec};

/// List parameters shared by every list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRequest {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,
    #[serde(default = "default_count_per_page")]
    #[validate(range(min = 1, message = "countPerPage must be at least 1"))]
    pub count_per_page: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Status filter; any of the listed statuses matches
    #[serde(default)]
    pub status: Vec<String>,
}

fn default_page() -> i64 {
    DEFAULT_PAGE_NUMBER
}

fn default_count_per_page() -> i64 {
    DEFAULT_COUNT_PER_PAGE
}

impl Default for SegmentRequest {
    fn default() -> Self {
        Self {
            sort_by: None,
            order_by: None,
            page: DEFAULT_PAGE_NUMBER,
            count_per_page: DEFAULT_COUNT_PER_PAGE,
            tags: Vec::new(),
            status: Vec::new(),
        }
    }
}

impl SegmentRequest {
    pub fn new(page: i64, count_per_page: i64) -> Self {
        Self {
            page,
            count_per_page,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, key: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort_by = Some(key.into());
        self.order_by = Some(order.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status.push(status.into());
        self
    }

    /// Validated page parameters
    pub fn page_spec(&self) -> AppResult<PageSpec> {
        self.validate()
            .map_err(|e| AppError::invalid_page(format_validation_errors(&e)))?;
        PageSpec::new(self.page, self.count_per_page)
    }

    pub fn direction(&self) -> AppResult<Direction> {
        Direction::parse_or_default(self.order_by.as_deref().map(str::trim))
    }

    /// Requested sort key, `CreatedAt` when absent or blank
    pub fn sort_key(&self) -> &str {
        self.sort_by
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(DEFAULT_SORT_KEY)
    }

    /// Requested tag texts, trimmed, blanks and duplicates removed
    pub fn requested_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags.iter().map(|t| t.trim()) {
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }

    /// Requested statuses, trimmed, blanks and duplicates removed
    pub fn requested_statuses(&self) -> Vec<&str> {
        let mut statuses: Vec<&str> = Vec::new();
        for status in self.status.iter().map(|s| s.trim()) {
            if !status.is_empty() && !statuses.contains(&status) {
                statuses.push(status);
            }
        }
        statuses
    }
}

/// Search parameters: list parameters plus keyword and date filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: Option<String>,
    /// Creation date, `yyyy-MM-dd`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(flatten)]
    pub segment: SegmentRequest,
}

impl SearchRequest {
    /// Whitespace separated keyword terms
    pub fn keywords(&self) -> Vec<&str> {
        self.keyword
            .as_deref()
            .map(|k| k.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn date_filter(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

/// One page of a list together with the parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResponse<T> {
    pub sort_by: String,
    pub order_by: String,
    pub page: u64,
    pub count_per_page: u64,
    pub total_pages: u64,
    pub total_data: u64,
    pub search_data: Vec<T>,
}

impl<T> SegmentResponse<T> {
    pub fn new(sort_by: impl Into<String>, direction: Direction, spec: PageSpec, page: Page<T>) -> Self {
        Self {
            sort_by: sort_by.into(),
            order_by: direction.as_str().to_string(),
            page: spec.page(),
            count_per_page: spec.count_per_page(),
            total_pages: page.total_pages,
            total_data: page.total_count,
            search_data: page.items,
        }
    }

    pub fn map<U, F>(self, f: F) -> SegmentResponse<U>
    where
        F: FnMut(T) -> U,
    {
        SegmentResponse {
            sort_by: self.sort_by,
            order_by: self.order_by,
            page: self.page,
            count_per_page: self.count_per_page,
            total_pages: self.total_pages,
            total_data: self.total_data,
            search_data: self.search_data.into_iter().map(f).collect(),
        }
    }
}

/// Comment page plus the viewer's own comment on the activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSegmentResponse {
    #[serde(flatten)]
    pub segment: SegmentResponse<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_comment: Option<Comment>,
}

/// Format validation errors into a user-friendly string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
