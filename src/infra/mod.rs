//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Entities and the generic repository
//! - Unit of Work for scoped, atomic persistence

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{EntityRef, Persisted, Repository};
pub use unit_of_work::{Persistence, RepositorySet, UnitOfWork};
