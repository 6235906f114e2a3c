//! Activity service - Activity lists, detail, search and bulk import.
//!
//! Lists that depend on related data (tags, the viewer's statuses) are
//! materialized and composed in memory; the trending list is a plain column
//! ordering and is pushed into the database. Given a viewer, public lists
//! carry that viewer's status on each activity of the page.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use super::branch_service::BranchManager;
use super::tag_service::TagManager;
use super::user_service::{UserManager, UserService};
use crate::config::{SEARCH_DATE_FORMAT, SORT_KEY_ADD_TIME, SORT_KEY_TREND};
use crate::domain::{Activity, ActivityStatus, NewActivity, StatusMark, Tag};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::entities::{activity, activity_status, activity_tag};
use crate::infra::UnitOfWork;
use crate::query::{
    paginate, paginate_select, ColumnSort, KeySelector, Page, PageSpec, SortSpec, SortValue,
    Sortable,
};
use crate::types::{SearchRequest, SegmentRequest, SegmentResponse};

/// Name of the leading ranking key added when tags are requested
const TAG_OVERLAP_KEY: &str = "TagOverlap";

/// Activity use cases.
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// Public activity list. A status filter turns it into the viewer's
    /// managed list, which needs a viewer.
    async fn list(
        &self,
        request: &SegmentRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<SegmentResponse<Activity>>;

    /// Activities the user marked, optionally restricted to the requested statuses
    async fn list_managed(
        &self,
        user_id: Uuid,
        request: &SegmentRequest,
    ) -> AppResult<SegmentResponse<Activity>>;

    /// Activities ordered by popularity
    async fn trending(
        &self,
        request: &SegmentRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<SegmentResponse<Activity>>;

    /// Activity detail; counts as a click
    async fn get(&self, id: Uuid) -> AppResult<Activity>;

    /// Keyword, date and tag search. Saves the search for a known viewer.
    async fn search(
        &self,
        request: &SearchRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<SegmentResponse<Activity>>;

    /// Create activities with their tags and branches in one commit
    async fn import(&self, activities: Vec<NewActivity>) -> AppResult<Vec<Activity>>;
}

/// Concrete implementation of ActivityService using Unit of Work.
pub struct ActivityManager {
    uow: Arc<UnitOfWork>,
    tags: TagManager,
    users: UserManager,
    branches: BranchManager,
}

impl ActivityManager {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self {
            tags: TagManager::new(Arc::clone(&uow)),
            users: UserManager::new(Arc::clone(&uow)),
            branches: BranchManager::new(Arc::clone(&uow)),
            uow,
        }
    }

    /// Sort keys accepted by activity lists
    pub fn sort_keys() -> Vec<&'static str> {
        let mut keys = vec![SORT_KEY_TREND, SORT_KEY_ADD_TIME];
        keys.extend(Activity::sort_keys());
        keys
    }

    /// Attach tags and branches to each model, preserving order
    async fn hydrate(&self, models: Vec<activity::Model>) -> AppResult<Vec<Activity>> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut tags = self.tags.tags_of(&ids).await?;
        let mut branches = self.branches.branches_of(&ids).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let own_tags = tags.remove(&model.id).unwrap_or_default();
                let own_branches = branches.remove(&model.id).unwrap_or_default();
                Activity::from(model)
                    .with_tags(own_tags)
                    .with_branches(own_branches)
            })
            .collect())
    }

    /// Mark each activity of the page with the viewer's status, if any.
    /// Applied after paging so the public ordering stays on creation time.
    async fn mark_for(
        &self,
        viewer: Option<Uuid>,
        page: Page<Activity>,
    ) -> AppResult<Page<Activity>> {
        let Some(user_id) = viewer else {
            return Ok(page);
        };
        let mut marks = self.users.activity_statuses(user_id).await?;
        if marks.is_empty() {
            return Ok(page);
        }

        Ok(page.map(|activity| match marks.remove(&activity.id) {
            Some(mark) => activity.with_status(mark),
            None => activity,
        }))
    }

    /// Activities carrying any of the requested tag texts; none when no tag resolves
    async fn tagged_activity_ids(&self, texts: &[String]) -> AppResult<Vec<Uuid>> {
        let tag_ids: Vec<Uuid> = self
            .tags
            .resolve_models(texts)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        self.tags.activities_tagged(&tag_ids).await
    }

    async fn activities_by_id(&self, ids: Vec<Uuid>) -> AppResult<Vec<activity::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.uow
            .repository::<activity::Entity>()
            .find(Condition::all().add(activity::Column::Id.is_in(ids)))
            .await
    }
}

/// Sort spec for an activity list: semantic keys first, then the fields of
/// [`Activity`]; a tag-overlap key leads when tags are requested.
fn activity_sort(request: &SegmentRequest) -> AppResult<SortSpec<Activity>> {
    let key = request.sort_key();
    let selector = if key.eq_ignore_ascii_case(SORT_KEY_TREND) {
        KeySelector::new(SORT_KEY_TREND, |a: &Activity| {
            SortValue::from(a.activity_clicked_count)
        })
    } else if key.eq_ignore_ascii_case(SORT_KEY_ADD_TIME) {
        KeySelector::new(SORT_KEY_ADD_TIME, |a: &Activity| SortValue::from(a.added_at()))
    } else {
        Activity::resolve_sort_key(key)?
    };

    let spec = SortSpec::new(request.direction()?).then_by(selector);
    let requested = request.requested_tags();
    if requested.is_empty() {
        return Ok(spec);
    }
    Ok(spec.rank_first(KeySelector::new(TAG_OVERLAP_KEY, move |a: &Activity| {
        SortValue::from(a.tag_overlap(&requested))
    })))
}

fn respond(
    request: &SegmentRequest,
    sort: &SortSpec<Activity>,
    spec: PageSpec,
    page: Page<Activity>,
) -> SegmentResponse<Activity> {
    SegmentResponse::new(request.sort_key(), sort.direction(), spec, page)
}

#[async_trait]
impl ActivityService for ActivityManager {
    async fn list(
        &self,
        request: &SegmentRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<SegmentResponse<Activity>> {
        if !request.requested_statuses().is_empty() {
            let user_id = viewer.ok_or(AppError::Unauthorized)?;
            return self.list_managed(user_id, request).await;
        }

        let spec = request.page_spec()?;
        let sort = activity_sort(request)?;

        let requested = request.requested_tags();
        let models = if requested.is_empty() {
            self.uow.repository::<activity::Entity>().all().await?
        } else {
            let ids = self.tagged_activity_ids(&requested).await?;
            self.activities_by_id(ids).await?
        };

        let activities = self.hydrate(models).await?;
        let page = paginate(activities, &sort, spec)?;
        let page = self.mark_for(viewer, page).await?;
        Ok(respond(request, &sort, spec, page))
    }

    async fn list_managed(
        &self,
        user_id: Uuid,
        request: &SegmentRequest,
    ) -> AppResult<SegmentResponse<Activity>> {
        let statuses = request
            .requested_statuses()
            .into_iter()
            .map(str::parse::<ActivityStatus>)
            .collect::<AppResult<Vec<_>>>()?;
        let spec = request.page_spec()?;
        let sort = activity_sort(request)?;

        let mut condition = Condition::all().add(activity_status::Column::UserId.eq(user_id));
        if !statuses.is_empty() {
            condition = condition.add(
                activity_status::Column::Status.is_in(statuses.iter().map(ActivityStatus::as_str)),
            );
        }
        let marks: HashMap<Uuid, StatusMark> = self
            .uow
            .repository::<activity_status::Entity>()
            .find(condition)
            .await?
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
            .collect();

        let mut ids: Vec<Uuid> = marks.keys().copied().collect();
        let requested = request.requested_tags();
        if !requested.is_empty() {
            let tagged = self.tagged_activity_ids(&requested).await?;
            ids.retain(|id| tagged.contains(id));
        }

        let models = self.activities_by_id(ids).await?;
        let activities: Vec<Activity> = self
            .hydrate(models)
            .await?
            .into_iter()
            .filter_map(|a| {
                let mark = marks.get(&a.id).cloned()?;
                Some(a.with_status(mark))
            })
            .collect();

        let page = paginate(activities, &sort, spec)?;
        Ok(respond(request, &sort, spec, page))
    }

    async fn trending(
        &self,
        request: &SegmentRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<SegmentResponse<Activity>> {
        let spec = request.page_spec()?;
        let direction = request.direction()?;
        let sort = ColumnSort::new(direction).then_by(activity::Column::ActivityClickedCount);

        let activities = self.uow.repository::<activity::Entity>();
        let page = paginate_select(activities.connection(), activities.query(), &sort, spec).await?;
        let items = self.hydrate(page.items).await?;

        let page = Page {
            items,
            total_count: page.total_count,
            total_pages: page.total_pages,
        };
        let page = self.mark_for(viewer, page).await?;
        Ok(SegmentResponse::new(SORT_KEY_TREND, direction, spec, page))
    }

    async fn get(&self, id: Uuid) -> AppResult<Activity> {
        let activities = self.uow.repository::<activity::Entity>();
        let mut model = activities.get_by_id(id).await?.ok_or_not_found("Activity")?;

        model.activity_clicked_count += 1;
        activities.update_fields(model.clone(), &[activity::Column::ActivityClickedCount]);
        self.uow.commit().await?;

        let mut loaded = self.hydrate(vec![model]).await?;
        loaded.pop().ok_or_not_found("Activity")
    }

    async fn search(
        &self,
        request: &SearchRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<SegmentResponse<Activity>> {
        let keywords = request.keywords();
        let date = request.date_filter();
        let requested = request.segment.requested_tags();
        if keywords.is_empty() && date.is_none() && requested.is_empty() {
            return Err(AppError::validation(
                "At least one of keyword, date or tags is required",
            ));
        }

        let spec = request.segment.page_spec()?;
        let sort = activity_sort(&request.segment)?;

        let mut condition = Condition::all();
        for word in &keywords {
            condition = condition.add(
                Condition::any()
                    .add(activity::Column::Title.contains(*word))
                    .add(activity::Column::Subtitle.contains(*word))
                    .add(activity::Column::Content.contains(*word)),
            );
        }
        if let Some(date) = date {
            let day = NaiveDate::parse_from_str(date, SEARCH_DATE_FORMAT).map_err(|_| {
                AppError::validation(format!("Invalid date '{}', expected yyyy-MM-dd", date))
            })?;
            let midnight = day
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| AppError::internal("Midnight is not representable"))?;
            let start = Utc.from_utc_datetime(&midnight);
            condition = condition
                .add(activity::Column::CreatedAt.gte(start))
                .add(activity::Column::CreatedAt.lt(start + Duration::days(1)));
        }

        let mut matched_any_tag = true;
        let mut clicked_tags = Vec::new();
        if !requested.is_empty() {
            clicked_tags = self.tags.resolve_models(&requested).await?;
            let tag_ids: Vec<Uuid> = clicked_tags.iter().map(|t| t.id).collect();
            let ids = self.tags.activities_tagged(&tag_ids).await?;
            matched_any_tag = !ids.is_empty();
            condition = condition.add(activity::Column::Id.is_in(ids));
        }

        let models = if matched_any_tag {
            self.uow.repository::<activity::Entity>().find(condition).await?
        } else {
            Vec::new()
        };
        let activities = self.hydrate(models).await?;
        let page = paginate(activities, &sort, spec)?;
        let page = self.mark_for(viewer, page).await?;

        self.tags.stage_clicks(clicked_tags);
        if let Some(user_id) = viewer {
            self.users.stage_search(user_id, request).await?;
        }
        self.uow.commit().await?;

        Ok(respond(&request.segment, &sort, spec, page))
    }

    async fn import(&self, activities: Vec<NewActivity>) -> AppResult<Vec<Activity>> {
        let now = Utc::now();
        let activity_repo = self.uow.repository::<activity::Entity>();
        let link_repo = self.uow.repository::<activity_tag::Entity>();

        if activities.iter().any(|a| a.title.trim().is_empty()) {
            return Err(AppError::validation("Activity title is required"));
        }
        let blank_branch = activities
            .iter()
            .flat_map(|a| &a.branches)
            .any(|b| b.branch_name.trim().is_empty());
        if blank_branch {
            return Err(AppError::validation("Branch name is required"));
        }

        let mut created = Vec::with_capacity(activities.len());
        for new_activity in &activities {
            let model = new_activity.to_model(now);
            activity_repo.add(model.clone());

            let mut tags: Vec<Tag> = Vec::new();
            for new_tag in &new_activity.tags {
                let tag = self.tags.find_or_stage(new_tag, now).await?;
                if tags.iter().any(|t| t.id == tag.id) {
                    continue;
                }
                link_repo.add(activity_tag::Model {
                    activity_id: model.id,
                    tag_id: tag.id,
                });
                tags.push(tag.into());
            }
            tags.sort_by(|a, b| a.text.cmp(&b.text).then_with(|| a.kind.cmp(&b.kind)));

            let branches = self
                .branches
                .stage_branches(model.id, &new_activity.branches, now)
                .await?;
            created.push(Activity::from(model).with_tags(tags).with_branches(branches));
        }

        let applied = self.uow.commit().await?;
        tracing::info!(activities = created.len(), changes = applied, "Activities imported");
        Ok(created)
    }
}
