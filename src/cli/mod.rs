//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `activities` - Activity lists, search and import
//! - `comments` - Activity comments
//! - `users` - Registration, statuses and search history
//! - `filters` - Accepted sort keys and statuses

pub mod args;

pub use args::{Cli, Commands};
