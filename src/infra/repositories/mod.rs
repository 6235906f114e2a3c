//! Repository layer - Data access abstraction
//!
//! One generic [`Repository`] serves every entity; the unit of work decides
//! which instance a caller gets.

mod base;
pub mod entities;

pub use base::{ChangeKind, ChangeSet, EntityRef, PendingChange, Persisted, Repository};
