//! Tag service - Tag lookup, click counting and activity tag loading.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, QueryOrder};
use uuid::Uuid;

use crate::domain::{NewTag, Tag};
use crate::errors::AppResult;
use crate::infra::repositories::entities::{activity_tag, tag};
use crate::infra::UnitOfWork;

/// Tag use cases.
#[async_trait]
pub trait TagService: Send + Sync {
    /// Tags with exactly this text, any type
    async fn find_by_text(&self, text: &str) -> AppResult<Vec<Tag>>;

    /// The tag with this text and type, if it exists
    async fn find_by_text_and_kind(&self, text: &str, kind: &str) -> AppResult<Option<Tag>>;

    /// Every stored tag whose text is one of `texts`
    async fn resolve_texts(&self, texts: &[String]) -> AppResult<Vec<Tag>>;

    /// Increment the click counter of each tag and commit
    async fn record_clicks(&self, tag_ids: &[Uuid]) -> AppResult<()>;

    /// All tags ordered by text
    async fn list_all(&self) -> AppResult<Vec<Tag>>;
}

/// Concrete implementation of TagService using Unit of Work.
pub struct TagManager {
    uow: Arc<UnitOfWork>,
}

impl TagManager {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub(crate) async fn resolve_models(&self, texts: &[String]) -> AppResult<Vec<tag::Model>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.uow
            .repository::<tag::Entity>()
            .find(Condition::all().add(tag::Column::Text.is_in(texts.iter().cloned())))
            .await
    }

    /// Stage a click on every tag; committed with the caller's unit of work
    pub(crate) fn stage_clicks(&self, tags: Vec<tag::Model>) {
        let repository = self.uow.repository::<tag::Entity>();
        for mut model in tags {
            model.tag_click_count += 1;
            repository.update_fields(model, &[tag::Column::TagClickCount]);
        }
    }

    /// Existing tag for `new_tag` (pending in this scope or stored), or a
    /// newly staged one. Every returned tag is attached to the scope.
    pub(crate) async fn find_or_stage(
        &self,
        new_tag: &NewTag,
        now: DateTime<Utc>,
    ) -> AppResult<tag::Model> {
        let repository = self.uow.repository::<tag::Entity>();

        let pending = repository
            .local()
            .into_iter()
            .find(|t| t.text == new_tag.text && t.kind == new_tag.kind);
        if let Some(existing) = pending {
            return Ok(existing);
        }

        let stored = repository
            .first(
                Condition::all()
                    .add(tag::Column::Text.eq(new_tag.text.as_str()))
                    .add(tag::Column::Kind.eq(new_tag.kind.as_str())),
            )
            .await?;
        if let Some(existing) = stored {
            repository.attach(existing.clone());
            return Ok(existing);
        }

        let created = new_tag.clone().into_model(now);
        tracing::debug!(text = %created.text, kind = %created.kind, "Staging new tag");
        repository.add(created.clone());
        Ok(created)
    }

    /// Ids of the activities carrying at least one of `tag_ids`
    pub(crate) async fn activities_tagged(&self, tag_ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let links = self
            .uow
            .repository::<activity_tag::Entity>()
            .find(
                Condition::all()
                    .add(activity_tag::Column::TagId.is_in(tag_ids.iter().copied())),
            )
            .await?;

        let mut ids: Vec<Uuid> = links.into_iter().map(|link| link.activity_id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Tags of each given activity, ordered by text
    pub(crate) async fn tags_of(&self, activity_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Tag>>> {
        let mut by_activity: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        if activity_ids.is_empty() {
            return Ok(by_activity);
        }

        let links = self
            .uow
            .repository::<activity_tag::Entity>()
            .find(
                Condition::all()
                    .add(activity_tag::Column::ActivityId.is_in(activity_ids.iter().copied())),
            )
            .await?;
        if links.is_empty() {
            return Ok(by_activity);
        }

        let tag_ids: Vec<Uuid> = links.iter().map(|link| link.tag_id).collect();
        let tags: HashMap<Uuid, Tag> = self
            .uow
            .repository::<tag::Entity>()
            .find(Condition::all().add(tag::Column::Id.is_in(tag_ids)))
            .await?
            .into_iter()
            .map(|model| (model.id, Tag::from(model)))
            .collect();

        for link in links {
            if let Some(tag) = tags.get(&link.tag_id) {
                by_activity
                    .entry(link.activity_id)
                    .or_default()
                    .push(tag.clone());
            }
        }
        for tags in by_activity.values_mut() {
            tags.sort_by(|a, b| a.text.cmp(&b.text).then_with(|| a.kind.cmp(&b.kind)));
        }
        Ok(by_activity)
    }
}

#[async_trait]
impl TagService for TagManager {
    async fn find_by_text(&self, text: &str) -> AppResult<Vec<Tag>> {
        let models = self
            .uow
            .repository::<tag::Entity>()
            .find(Condition::all().add(tag::Column::Text.eq(text)))
            .await?;

        Ok(models.into_iter().map(Tag::from).collect())
    }

    async fn find_by_text_and_kind(&self, text: &str, kind: &str) -> AppResult<Option<Tag>> {
        let model = self
            .uow
            .repository::<tag::Entity>()
            .first(
                Condition::all()
                    .add(tag::Column::Text.eq(text))
                    .add(tag::Column::Kind.eq(kind)),
            )
            .await?;

        Ok(model.map(Tag::from))
    }

    async fn resolve_texts(&self, texts: &[String]) -> AppResult<Vec<Tag>> {
        let models = self.resolve_models(texts).await?;
        Ok(models.into_iter().map(Tag::from).collect())
    }

    async fn record_clicks(&self, tag_ids: &[Uuid]) -> AppResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let models = self
            .uow
            .repository::<tag::Entity>()
            .find(Condition::all().add(tag::Column::Id.is_in(tag_ids.iter().copied())))
            .await?;

        self.stage_clicks(models);
        self.uow.commit().await?;
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Tag>> {
        let repository = self.uow.repository::<tag::Entity>();
        let models = repository
            .query()
            .order_by_asc(tag::Column::Text)
            .order_by_asc(tag::Column::Kind)
            .all(repository.connection())
            .await?;

        Ok(models.into_iter().map(Tag::from).collect())
    }
}
