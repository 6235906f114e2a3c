//! User service - Registration, activity statuses and search history.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::config::SORT_KEY_ADD_TIME;
use crate::domain::{ActivityStatus, SearchHistory, StatusMark, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::entities::{activity, activity_status, search_history, user};
use crate::infra::UnitOfWork;
use crate::query::{paginate_select, ColumnSort};
use crate::types::{SearchRequest, SegmentRequest, SegmentResponse};

/// User use cases.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user; the email must not be registered yet
    async fn register(&self, email: &str, nick_name: Option<String>) -> AppResult<User>;

    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Insert or change the user's status for an activity
    async fn set_activity_status(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
        status: ActivityStatus,
    ) -> AppResult<StatusMark>;

    /// Remove the user's statuses for the given activities; returns how many were removed
    async fn remove_activity_statuses(&self, user_id: Uuid, activity_ids: &[Uuid]) -> AppResult<usize>;

    /// The user's status per activity
    async fn activity_statuses(&self, user_id: Uuid) -> AppResult<HashMap<Uuid, StatusMark>>;

    /// Page of the user's saved searches
    async fn search_history(
        &self,
        user_id: Uuid,
        request: &SegmentRequest,
    ) -> AppResult<SegmentResponse<SearchHistory>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager {
    uow: Arc<UnitOfWork>,
}

impl UserManager {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Stage a search-history row for a known user; committed with the
    /// caller's unit of work. Unknown users are skipped.
    pub(crate) async fn stage_search(&self, user_id: Uuid, request: &SearchRequest) -> AppResult<bool> {
        if self.uow.repository::<user::Entity>().get_by_id(user_id).await?.is_none() {
            tracing::debug!(%user_id, "Skipping search history for unknown user");
            return Ok(false);
        }

        let tags = request.segment.requested_tags();
        let now = Utc::now();
        self.uow
            .repository::<search_history::Entity>()
            .add(search_history::Model {
                id: 0,
                user_id,
                keyword: request.keyword.clone().filter(|k| !k.trim().is_empty()),
                date: request.date_filter().map(str::to_string),
                tags: (!tags.is_empty()).then(|| tags.join(",")),
                created_at: now,
                modified_at: now,
            });
        Ok(true)
    }

    async fn status_row(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> AppResult<Option<activity_status::Model>> {
        self.uow
            .repository::<activity_status::Entity>()
            .first(
                Condition::all()
                    .add(activity_status::Column::UserId.eq(user_id))
                    .add(activity_status::Column::ActivityId.eq(activity_id)),
            )
            .await
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, email: &str, nick_name: Option<String>) -> AppResult<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }

        let users = self.uow.repository::<user::Entity>();
        let taken = users
            .first(Condition::all().add(user::Column::Email.eq(email)))
            .await?;
        if taken.is_some() {
            return Err(AppError::validation("Email already registered"));
        }

        let now = Utc::now();
        let model = user::Model {
            id: Uuid::new_v4(),
            email: email.to_string(),
            nick_name,
            created_at: now,
            modified_at: now,
        };
        users.add(model.clone());
        self.uow.commit().await?;

        tracing::info!(user_id = %model.id, "User registered");
        Ok(User::from(model))
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .repository::<user::Entity>()
            .get_by_id(id)
            .await?
            .map(User::from)
            .ok_or_not_found("User")
    }

    async fn set_activity_status(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
        status: ActivityStatus,
    ) -> AppResult<StatusMark> {
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

        let statuses = self.uow.repository::<activity_status::Entity>();
        let now = Utc::now();

        match self.status_row(user_id, activity_id).await? {
            Some(mut row) => {
                row.status = status.as_str().to_string();
                row.modified_at = now;
                statuses.update_fields(
                    row,
                    &[
                        activity_status::Column::Status,
                        activity_status::Column::ModifiedAt,
                    ],
                );
            }
            None => statuses.add(activity_status::Model {
                id: 0,
                user_id,
                activity_id,
                status: status.as_str().to_string(),
                created_at: now,
                modified_at: now,
            }),
        }
        self.uow.commit().await?;

        Ok(StatusMark {
            status: status.as_str().to_string(),
            changed_at: now,
        })
    }

    async fn remove_activity_statuses(&self, user_id: Uuid, activity_ids: &[Uuid]) -> AppResult<usize> {
        if activity_ids.is_empty() {
            return Ok(0);
        }

        let statuses = self.uow.repository::<activity_status::Entity>();
        let rows = statuses
            .find(
                Condition::all()
                    .add(activity_status::Column::UserId.eq(user_id))
                    .add(activity_status::Column::ActivityId.is_in(activity_ids.iter().copied())),
            )
            .await?;
        if rows.is_empty() {
            return Ok(0);
        }

        statuses.remove_range(&rows);
        self.uow.commit().await?;
        Ok(rows.len())
    }

    async fn activity_statuses(&self, user_id: Uuid) -> AppResult<HashMap<Uuid, StatusMark>> {
        let rows = self
            .uow
            .repository::<activity_status::Entity>()
            .find(Condition::all().add(activity_status::Column::UserId.eq(user_id)))
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.activity_id,
                    StatusMark {
                        status: row.status,
                        changed_at: row.modified_at,
                    },
                )
            })
            .collect())
    }

    async fn search_history(
        &self,
        user_id: Uuid,
        request: &SegmentRequest,
    ) -> AppResult<SegmentResponse<SearchHistory>> {
        let spec = request.page_spec()?;
        let direction = request.direction()?;
        let key = request.sort_key();
        let sort = if key.eq_ignore_ascii_case(SORT_KEY_ADD_TIME) {
            ColumnSort::new(direction).then_by(search_history::Column::CreatedAt)
        } else {
            ColumnSort::new(direction).then_by_name(key)?
        };

        let histories = self.uow.repository::<search_history::Entity>();
        let select = histories
            .query_where(Condition::all().add(search_history::Column::UserId.eq(user_id)));
        let page = paginate_select(histories.connection(), select, &sort, spec).await?;

        Ok(SegmentResponse::new(key, direction, spec, page).map(SearchHistory::from))
    }
}
