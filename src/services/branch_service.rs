//! Branch service - Branches of activities and the locations they share.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::domain::branch::new_location;
use crate::domain::{Branch, Location, NewBranch};
use crate::errors::AppResult;
use crate::infra::repositories::entities::{branch, branch_location, location};
use crate::infra::UnitOfWork;

/// Branch and location use cases.
#[async_trait]
pub trait BranchService: Send + Sync {
    /// The location with exactly this content, if stored
    async fn find_location(&self, content: &str) -> AppResult<Option<Location>>;

    /// Branches of one activity, ordered by name
    async fn branches_of_activity(&self, activity_id: Uuid) -> AppResult<Vec<Branch>>;
}

/// Concrete implementation of BranchService using Unit of Work.
pub struct BranchManager {
    uow: Arc<UnitOfWork>,
}

impl BranchManager {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Existing location for `content` (pending in this scope or stored), or
    /// a newly staged one. Every returned location is attached to the scope.
    pub(crate) async fn find_or_stage_location(
        &self,
        content: &str,
        now: DateTime<Utc>,
    ) -> AppResult<location::Model> {
        let repository = self.uow.repository::<location::Entity>();

        if let Some(existing) = repository.local().into_iter().find(|l| l.content == content) {
            return Ok(existing);
        }

        let stored = repository
            .first(Condition::all().add(location::Column::Content.eq(content)))
            .await?;
        if let Some(existing) = stored {
            repository.attach(existing.clone());
            return Ok(existing);
        }

        let created = new_location(content, now);
        tracing::debug!(content = %created.content, "Staging new location");
        repository.add(created.clone());
        Ok(created)
    }

    /// Stage the branches of a staged activity with their locations and links
    pub(crate) async fn stage_branches(
        &self,
        activity_id: Uuid,
        branches: &[NewBranch],
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Branch>> {
        let branch_repo = self.uow.repository::<branch::Entity>();
        let link_repo = self.uow.repository::<branch_location::Entity>();

        let mut staged = Vec::with_capacity(branches.len());
        for new_branch in branches {
            let model = new_branch.to_model(activity_id, now);
            branch_repo.add(model.clone());

            let mut contents = Vec::new();
            for content in new_branch.location_contents() {
                let location = self.find_or_stage_location(content, now).await?;
                link_repo.add(branch_location::Model {
                    branch_id: model.id,
                    location_id: location.id,
                });
                contents.push(location.content);
            }
            staged.push(Branch::from_model(model, contents));
        }
        staged.sort_by(|a, b| a.branch_name.cmp(&b.branch_name));
        Ok(staged)
    }

    /// Branches of each given activity with their location contents
    pub(crate) async fn branches_of(
        &self,
        activity_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<Branch>>> {
        let mut by_activity: HashMap<Uuid, Vec<Branch>> = HashMap::new();
        if activity_ids.is_empty() {
            return Ok(by_activity);
        }

        let branches = self
            .uow
            .repository::<branch::Entity>()
            .find(
                Condition::all()
                    .add(branch::Column::ActivityId.is_in(activity_ids.iter().copied())),
            )
            .await?;
        if branches.is_empty() {
            return Ok(by_activity);
        }

        let links = self
            .uow
            .repository::<branch_location::Entity>()
            .find(
                Condition::all().add(
                    branch_location::Column::BranchId.is_in(branches.iter().map(|b| b.id)),
                ),
            )
            .await?;
        let contents: HashMap<Uuid, String> = if links.is_empty() {
            HashMap::new()
        } else {
            self.uow
                .repository::<location::Entity>()
                .find(
                    Condition::all()
                        .add(location::Column::Id.is_in(links.iter().map(|l| l.location_id))),
                )
                .await?
                .into_iter()
                .map(|l| (l.id, l.content))
                .collect()
        };

        let mut locations_of: HashMap<Uuid, Vec<String>> = HashMap::new();
        for link in links {
            if let Some(content) = contents.get(&link.location_id) {
                locations_of
                    .entry(link.branch_id)
                    .or_default()
                    .push(content.clone());
            }
        }

        for model in branches {
            let locations = locations_of.remove(&model.id).unwrap_or_default();
            by_activity
                .entry(model.activity_id)
                .or_default()
                .push(Branch::from_model(model, locations));
        }
        for branches in by_activity.values_mut() {
            branches.sort_by(|a, b| a.branch_name.cmp(&b.branch_name));
        }
        Ok(by_activity)
    }
}

#[async_trait]
impl BranchService for BranchManager {
    async fn find_location(&self, content: &str) -> AppResult<Option<Location>> {
        let model = self
            .uow
            .repository::<location::Entity>()
            .first(Condition::all().add(location::Column::Content.eq(content.trim())))
            .await?;

        Ok(model.map(Location::from))
    }

    async fn branches_of_activity(&self, activity_id: Uuid) -> AppResult<Vec<Branch>> {
        let mut by_activity = self.branches_of(&[activity_id]).await?;
        Ok(by_activity.remove(&activity_id).unwrap_or_default())
    }
}
