//! Migration: Create the catalog tables.
//!
//! Tables are derived from the entity definitions so that columns and
//! foreign keys cannot drift from the models.

use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::infra::repositories::entities::{
    activity, activity_status, activity_tag, comment, search_history, tag, user,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents before children
        create_table(manager, &schema, user::Entity).await?;
        create_table(manager, &schema, activity::Entity).await?;
        create_table(manager, &schema, tag::Entity).await?;
        create_table(manager, &schema, activity_tag::Entity).await?;
        create_table(manager, &schema, activity_status::Entity).await?;
        create_table(manager, &schema, comment::Entity).await?;
        create_table(manager, &schema, search_history::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_text_type")
                    .table(tag::Entity)
                    .col(tag::Column::Text)
                    .col(tag::Column::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_statuses_user_activity")
                    .table(activity_status::Entity)
                    .col(activity_status::Column::UserId)
                    .col(activity_status::Column::ActivityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_activity_id")
                    .table(comment::Entity)
                    .col(comment::Column::ActivityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children before parents
        drop_table(manager, search_history::Entity).await?;
        drop_table(manager, comment::Entity).await?;
        drop_table(manager, activity_status::Entity).await?;
        drop_table(manager, activity_tag::Entity).await?;
        drop_table(manager, tag::Entity).await?;
        drop_table(manager, activity::Entity).await?;
        drop_table(manager, user::Entity).await
    }
}

async fn create_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

async fn drop_table<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
