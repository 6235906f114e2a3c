//! Activities command - Lists, detail, search and import.

use crate::cli::args::{ActivitiesAction, ActivitiesArgs};
use crate::config::Config;
use crate::domain::NewActivity;
use crate::errors::{AppError, AppResult};
use crate::services::{ActivityManager, ActivityService};

use super::{open_unit_of_work, print_json};

/// Execute the activities command
pub async fn execute(args: ActivitiesArgs, config: Config) -> AppResult<()> {
    let uow = open_unit_of_work(&config).await?;
    let service = ActivityManager::new(uow);

    match args.action {
        ActivitiesAction::List { list, viewer } => {
            let response = service.list(&list.into(), viewer).await?;
            print_json(&response)
        }
        ActivitiesAction::Trend { list, viewer } => {
            let response = service.trending(&list.into(), viewer).await?;
            print_json(&response)
        }
        ActivitiesAction::Show { id } => {
            let activity = service.get(id).await?;
            print_json(&activity)
        }
        ActivitiesAction::Search {
            keyword,
            date,
            list,
            viewer,
        } => {
            let request = ActivitiesAction::search_request(keyword, date, list);
            let response = service.search(&request, viewer).await?;
            print_json(&response)
        }
        ActivitiesAction::Import { file } => {
            let raw = tokio::fs::read_to_string(&file).await.map_err(|e| {
                AppError::validation(format!("Cannot read {}: {}", file.display(), e))
            })?;
            let activities: Vec<NewActivity> = serde_json::from_str(&raw)
                .map_err(|e| AppError::validation(format!("Invalid import file: {}", e)))?;

            tracing::info!(count = activities.len(), "Importing activities");
            let created = service.import(activities).await?;
            print_json(&created)
        }
    }
}
