//! Users command - Registration, activity statuses and search history.

use crate::cli::args::{UsersAction, UsersArgs};
use crate::config::Config;
use crate::domain::ActivityStatus;
use crate::errors::AppResult;
use crate::services::{UserManager, UserService};

use super::{open_unit_of_work, print_json};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    let uow = open_unit_of_work(&config).await?;
    let service = UserManager::new(uow);

    match args.action {
        UsersAction::Register { email, nick_name } => {
            let user = service.register(&email, nick_name).await?;
            print_json(&user)
        }
        UsersAction::SetStatus {
            user,
            activity_id,
            status,
        } => {
            let status: ActivityStatus = status.parse()?;
            let mark = service.set_activity_status(user, activity_id, status).await?;
            print_json(&mark)
        }
        UsersAction::RemoveStatus { user, activity_ids } => {
            let removed = service.remove_activity_statuses(user, &activity_ids).await?;
            tracing::info!(removed, "Activity statuses removed");
            Ok(())
        }
        UsersAction::History { user, list } => {
            let response = service.search_history(user, &list.into()).await?;
            print_json(&response)
        }
    }
}
