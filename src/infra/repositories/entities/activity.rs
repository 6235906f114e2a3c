//! Activity database entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Popularity counter, bumped on every detail view
    pub activity_clicked_count: i32,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity_tag::Entity")]
    ActivityTag,
    #[sea_orm(has_many = "super::activity_status::Entity")]
    ActivityStatus,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::branch::Entity")]
    Branch,
}

impl Related<super::activity_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityTag.def()
    }
}

impl Related<super::activity_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityStatus.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::activity_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::activity_tag::Relation::Activity.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
