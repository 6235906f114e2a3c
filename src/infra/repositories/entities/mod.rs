//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod activity;
pub mod activity_status;
pub mod activity_tag;
pub mod branch;
pub mod branch_location;
pub mod comment;
pub mod location;
pub mod search_history;
pub mod tag;
pub mod user;

use uuid::Uuid;

use super::base::EntityRef;

macro_rules! entity_ref {
    ($model:path, $key:ty, |$m:ident| $expr:expr) => {
        impl EntityRef for $model {
            type Key = $key;

            fn key(&self) -> Self::Key {
                let $m = self;
                $expr
            }
        }
    };
}

entity_ref!(user::Model, Uuid, |m| m.id);
entity_ref!(activity::Model, Uuid, |m| m.id);
entity_ref!(tag::Model, Uuid, |m| m.id);
entity_ref!(activity_tag::Model, (Uuid, Uuid), |m| (m.activity_id, m.tag_id));
entity_ref!(branch::Model, Uuid, |m| m.id);
entity_ref!(location::Model, Uuid, |m| m.id);
entity_ref!(branch_location::Model, (Uuid, Uuid), |m| (m.branch_id, m.location_id));
entity_ref!(activity_status::Model, i32, |m| m.id);
entity_ref!(comment::Model, Uuid, |m| m.id);
entity_ref!(search_history::Model, i32, |m| m.id);
