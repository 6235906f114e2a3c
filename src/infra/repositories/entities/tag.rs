//! Tag database entity for SeaORM.
//!
//! `(text, type)` is unique; the index is created by the catalog migration.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub text: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub tag_click_count: i32,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity_tag::Entity")]
    ActivityTag,
}

impl Related<super::activity_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityTag.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        super::activity_tag::Relation::Activity.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::activity_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
