//! Comment service - Listing, posting and deleting activity comments.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, QueryOrder};
use uuid::Uuid;

use crate::config::SORT_KEY_ADD_TIME;
use crate::domain::{Comment, NewComment};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::entities::{activity, comment, user};
use crate::infra::UnitOfWork;
use crate::query::{paginate_select, ColumnSort};
use crate::types::{CommentSegmentResponse, SegmentRequest, SegmentResponse};

/// Lowest and highest accepted rate
const RATE_RANGE: std::ops::RangeInclusive<i32> = 0..=5;

/// Sort keys accepted by comment lists and the column each orders by
const SORT_COLUMNS: &[(&str, comment::Column)] = &[
    (SORT_KEY_ADD_TIME, comment::Column::CreatedAt),
    ("CreatedAt", comment::Column::CreatedAt),
    ("ModifiedAt", comment::Column::ModifiedAt),
    ("Rate", comment::Column::Rate),
    ("Sequence", comment::Column::Sequence),
    ("Content", comment::Column::Content),
];

/// Comment use cases.
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Page of an activity's comments, plus the viewer's own comment when
    /// a viewer is given
    async fn list(
        &self,
        activity_id: Uuid,
        request: &SegmentRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<CommentSegmentResponse>;

    /// Post the user's comment on an activity; a second post edits the first
    async fn post(&self, user_id: Uuid, activity_id: Uuid, comment: NewComment) -> AppResult<Comment>;

    /// Delete a comment written by the user
    async fn delete(&self, user_id: Uuid, comment_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CommentService using Unit of Work.
pub struct CommentManager {
    uow: Arc<UnitOfWork>,
}

impl CommentManager {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Sort keys accepted by comment lists
    pub fn sort_keys() -> Vec<&'static str> {
        SORT_COLUMNS.iter().map(|(name, _)| *name).collect()
    }

    async fn next_sequence(&self, activity_id: Uuid) -> AppResult<i32> {
        let comments = self.uow.repository::<comment::Entity>();
        let last = comments
            .query_where(Condition::all().add(comment::Column::ActivityId.eq(activity_id)))
            .order_by_desc(comment::Column::Sequence)
            .one(comments.connection())
            .await?;

        Ok(last.map_or(1, |c| c.sequence + 1))
    }
}

/// Column for an advertised sort key; case and underscores are ignored
fn sort_column(key: &str) -> AppResult<comment::Column> {
    let wanted = key.replace('_', "");
    SORT_COLUMNS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&wanted))
        .map(|(_, column)| *column)
        .ok_or_else(|| AppError::invalid_sort_key(key, "Comment"))
}

fn validate(comment: &NewComment) -> AppResult<()> {
    if comment.content.trim().is_empty() {
        return Err(AppError::validation("Comment content is required"));
    }
    if !RATE_RANGE.contains(&comment.rate) {
        return Err(AppError::validation(format!(
            "Rate must be between {} and {}",
            RATE_RANGE.start(),
            RATE_RANGE.end()
        )));
    }
    Ok(())
}

#[async_trait]
impl CommentService for CommentManager {
    async fn list(
        &self,
        activity_id: Uuid,
        request: &SegmentRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<CommentSegmentResponse> {
        let spec = request.page_spec()?;
        let direction = request.direction()?;
        let key = request.sort_key();
        let sort = ColumnSort::new(direction).then_by(sort_column(key)?);

        self.uow
            .repository::<activity::Entity>()
            .get_by_id(activity_id)
            .await?
            .ok_or_not_found("Activity")?;

        let comments = self.uow.repository::<comment::Entity>();
        let select =
            comments.query_where(Condition::all().add(comment::Column::ActivityId.eq(activity_id)));
        let page = paginate_select(comments.connection(), select, &sort, spec).await?;

        let user_comment = match viewer {
            Some(user_id) => comments
                .first(
                    Condition::all()
                        .add(comment::Column::ActivityId.eq(activity_id))
                        .add(comment::Column::UserId.eq(user_id)),
                )
                .await?
                .map(Comment::from),
            None => None,
        };

        Ok(CommentSegmentResponse {
            segment: SegmentResponse::new(key, direction, spec, page).map(Comment::from),
            user_comment,
        })
    }

    async fn post(&self, user_id: Uuid, activity_id: Uuid, new_comment: NewComment) -> AppResult<Comment> {
        validate(&new_comment)?;

        self.uow
            .repository::<user::Entity>()
            .get_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;
        self.uow
            .repository::<activity::Entity>()
            .get_by_id(activity_id)
            .await?
            .ok_or_not_found("Activity")?;

        let comments = self.uow.repository::<comment::Entity>();
        let now = Utc::now();
        let existing = comments
            .first(
                Condition::all()
                    .add(comment::Column::ActivityId.eq(activity_id))
                    .add(comment::Column::UserId.eq(user_id)),
            )
            .await?;

        let saved = match existing {
            Some(mut model) => {
                model.content = new_comment.content;
                model.rate = new_comment.rate;
                model.modified_at = now;
                comments.update_fields(
                    model.clone(),
                    &[
                        comment::Column::Content,
                        comment::Column::Rate,
                        comment::Column::ModifiedAt,
                    ],
                );
                model
            }
            None => {
                let model = comment::Model {
                    id: Uuid::new_v4(),
                    activity_id,
                    user_id,
                    content: new_comment.content,
                    rate: new_comment.rate,
                    sequence: self.next_sequence(activity_id).await?,
                    created_at: now,
                    modified_at: now,
                };
                comments.add(model.clone());
                model
            }
        };
        self.uow.commit().await?;

        Ok(Comment::from(saved))
    }

    async fn delete(&self, user_id: Uuid, comment_id: Uuid) -> AppResult<()> {
        let comments = self.uow.repository::<comment::Entity>();
        let model = comments
            .get_by_id(comment_id)
            .await?
            .ok_or_not_found("Comment")?;
        if model.user_id != user_id {
            return Err(AppError::Unauthorized);
        }

        comments.delete(&model);
        self.uow.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::IdenStatic;

    use super::*;

    #[test]
    fn test_validate_rejects_blank_content_and_bad_rate() {
        let blank = NewComment {
            content: "  ".into(),
            rate: 3,
        };
        let too_high = NewComment {
            content: "Great".into(),
            rate: 9,
        };

        assert!(matches!(validate(&blank), Err(AppError::Validation(_))));
        assert!(matches!(validate(&too_high), Err(AppError::Validation(_))));
        assert!(validate(&NewComment {
            content: "Great".into(),
            rate: 5
        })
        .is_ok());
    }

    #[test]
    fn test_sort_column_accepts_only_advertised_keys() {
        assert_eq!(sort_column("add_time").unwrap().as_str(), "created_at");
        assert_eq!(sort_column("sequence").unwrap().as_str(), "sequence");

        for key in ["UserId", "ActivityId", "Id"] {
            assert!(matches!(
                sort_column(key),
                Err(AppError::InvalidSortKey { .. })
            ));
        }
    }
}
