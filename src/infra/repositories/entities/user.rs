//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub nick_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activity_status::Entity")]
    ActivityStatus,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::search_history::Entity")]
    SearchHistory,
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

impl Related<super::search_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
