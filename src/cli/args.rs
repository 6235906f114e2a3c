//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::config::{DEFAULT_COUNT_PER_PAGE, DEFAULT_PAGE_NUMBER};
use crate::types::{SearchRequest, SegmentRequest};

/// Activer catalog backend - activities, tags, comments and search history
#[derive(Parser, Debug)]
#[command(name = "activer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Browse, search and import activities
    Activities(ActivitiesArgs),

    /// Read and write activity comments
    Comments(CommentsArgs),

    /// Users, their activity statuses and search history
    Users(UsersArgs),

    /// Print accepted sort keys and statuses
    Filters,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// List parameters shared by every list command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Sort key (e.g. Trend, AddTime, CreatedAt, Title)
    #[arg(long)]
    pub sort_by: Option<String>,

    /// ascending or descending
    #[arg(long)]
    pub order_by: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PAGE_NUMBER, allow_negative_numbers = true)]
    pub page: i64,

    #[arg(long, default_value_t = DEFAULT_COUNT_PER_PAGE, allow_negative_numbers = true)]
    pub count_per_page: i64,

    /// Tag filter, repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Status filter (wish, registered, completed), repeatable
    #[arg(long)]
    pub status: Vec<String>,
}

impl From<ListArgs> for SegmentRequest {
    fn from(args: ListArgs) -> Self {
        SegmentRequest {
            sort_by: args.sort_by,
            order_by: args.order_by,
            page: args.page,
            count_per_page: args.count_per_page,
            tags: args.tags,
            status: args.status,
        }
    }
}

/// Arguments for the activities command
#[derive(Parser, Debug)]
pub struct ActivitiesArgs {
    #[command(subcommand)]
    pub action: ActivitiesAction,
}

#[derive(Subcommand, Debug)]
pub enum ActivitiesAction {
    /// List activities; with --status, the viewer's managed activities
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Viewing user
        #[arg(long)]
        viewer: Option<Uuid>,
    },
    /// List activities by popularity
    Trend {
        #[command(flatten)]
        list: ListArgs,
        /// Viewing user; marks activities with their status
        #[arg(long)]
        viewer: Option<Uuid>,
    },
    /// Show one activity (counts as a click)
    Show { id: Uuid },
    /// Search by keyword, date and tags
    Search {
        #[arg(long)]
        keyword: Option<String>,
        /// Creation date, yyyy-MM-dd
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        viewer: Option<Uuid>,
    },
    /// Import activities from a JSON array file
    Import { file: PathBuf },
}

impl ActivitiesAction {
    pub(crate) fn search_request(keyword: Option<String>, date: Option<String>, list: ListArgs) -> SearchRequest {
        SearchRequest {
            keyword,
            date,
            segment: list.into(),
        }
    }
}

/// Arguments for the comments command
#[derive(Parser, Debug)]
pub struct CommentsArgs {
    #[command(subcommand)]
    pub action: CommentsAction,
}

#[derive(Subcommand, Debug)]
pub enum CommentsAction {
    /// List an activity's comments
    List {
        activity_id: Uuid,
        #[command(flatten)]
        list: ListArgs,
        /// Viewing user; their own comment is returned alongside the page
        #[arg(long)]
        viewer: Option<Uuid>,
    },
    /// Post or edit the user's comment on an activity
    Post {
        #[arg(long)]
        user: Uuid,
        activity_id: Uuid,
        content: String,
        #[arg(long, default_value_t = 5)]
        rate: i32,
    },
    /// Delete the user's comment
    Delete {
        #[arg(long)]
        user: Uuid,
        comment_id: Uuid,
    },
}

/// Arguments for the users command
#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// Register a user
    Register {
        email: String,
        #[arg(long)]
        nick_name: Option<String>,
    },
    /// Set the user's status for an activity
    SetStatus {
        user: Uuid,
        activity_id: Uuid,
        status: String,
    },
    /// Remove the user's statuses for activities
    RemoveStatus {
        user: Uuid,
        #[arg(required = true)]
        activity_ids: Vec<Uuid>,
    },
    /// List the user's saved searches
    History {
        user: Uuid,
        #[command(flatten)]
        list: ListArgs,
    },
}
