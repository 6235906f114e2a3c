//! Activer catalog backend core.
//!
//! Activities, tags, comments, user statuses and search history on top of a
//! generic repository, a scoped unit of work and a query composition engine
//! shared by every list operation.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities
//! - **services**: Application use cases
//! - **infra**: Database, entities, repositories and unit of work
//! - **query**: Sorting and paging composition
//! - **types**: List request and response shapes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Most clicked activities, second page
//! cargo run -- activities list --sort-by Trend --page 2
//!
//! # Search by keyword and tag
//! cargo run -- activities search --keyword camp --tag outdoor
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod query;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Activity, Comment, Tag, User};
pub use errors::{AppError, AppResult};
pub use infra::{Persistence, UnitOfWork};
