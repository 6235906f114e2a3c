//! Location database entity for SeaORM. `content` is unique.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub content: String,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::branch_location::Entity")]
    BranchLocation,
}

impl Related<super::branch_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BranchLocation.def()
    }
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        super::branch_location::Relation::Branch.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::branch_location::Relation::Location.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
