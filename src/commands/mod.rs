//! Commands module - CLI command implementations.
//!
//! Each command opens one unit of work, runs one service call and prints
//! the result as JSON.

pub mod activities;
pub mod comments;
pub mod migrate;
pub mod users;

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};

/// Connect, apply migrations and open a unit of work
pub(crate) async fn open_unit_of_work(config: &Config) -> AppResult<Arc<UnitOfWork>> {
    let db = Database::connect(config).await?;
    Ok(Arc::new(Persistence::new(db.get_connection()).begin()))
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Execute the filters command
pub fn filters() -> AppResult<()> {
    print_json(&crate::services::filter_values())
}
