//! Migration: Create activity branches and their locations.

use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::infra::repositories::entities::{branch, branch_location, location};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        create_table(manager, &schema, branch::Entity).await?;
        create_table(manager, &schema, location::Entity).await?;
        create_table(manager, &schema, branch_location::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_branches_activity_id")
                    .table(branch::Entity)
                    .col(branch::Column::ActivityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, branch_location::Entity).await?;
        drop_table(manager, location::Entity).await?;
        drop_table(manager, branch::Entity).await
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
