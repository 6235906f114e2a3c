//! Branch database entity for SeaORM.
//!
//! A branch is one offering of an activity; it is held at any number of
//! locations through `branch_locations`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub activity_id: Uuid,
    pub branch_name: String,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id",
        on_delete = "Cascade"
    )]
    Activity,
    #[sea_orm(has_many = "super::branch_location::Entity")]
    BranchLocation,
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::branch_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BranchLocation.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        super::branch_location::Relation::Location.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::branch_location::Relation::Branch.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
