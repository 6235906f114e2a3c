//! Domain layer - Core business entities
//!
//! Domain models are built from the database entities and carry what the
//! list operations sort and filter on.

pub mod activity;
pub mod branch;
pub mod comment;
pub mod search_history;
pub mod tag;
pub mod user;

pub use activity::{Activity, NewActivity, StatusMark};
pub use branch::{Branch, Location, NewBranch};
pub use comment::{Comment, NewComment};
pub use search_history::SearchHistory;
pub use tag::{NewTag, Tag, DEFAULT_TAG_KIND};
pub use user::{ActivityStatus, User};
