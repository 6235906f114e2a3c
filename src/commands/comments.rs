//! Comments command - List, post and delete comments.

use crate::cli::args::{CommentsAction, CommentsArgs};
use crate::config::Config;
use crate::domain::NewComment;
use crate::errors::AppResult;
use crate::services::{CommentManager, CommentService};

use super::{open_unit_of_work, print_json};

/// Execute the comments command
pub async fn execute(args: CommentsArgs, config: Config) -> AppResult<()> {
    let uow = open_unit_of_work(&config).await?;
    let service = CommentManager::new(uow);

    match args.action {
        CommentsAction::List {
            activity_id,
            list,
            viewer,
        } => {
            let response = service.list(activity_id, &list.into(), viewer).await?;
            print_json(&response)
        }
        CommentsAction::Post {
            user,
            activity_id,
            content,
            rate,
        } => {
            let comment = service
                .post(user, activity_id, NewComment { content, rate })
                .await?;
            print_json(&comment)
        }
        CommentsAction::Delete { user, comment_id } => {
            service.delete(user, comment_id).await?;
            tracing::info!(%comment_id, "Comment deleted");
            Ok(())
        }
    }
}
