//! Shared fixtures: an in-memory SQLite database with the real migrations.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use activer_api::infra::repositories::entities::{
    activity, activity_status, activity_tag, comment, tag, user,
};
use activer_api::infra::{Migrator, Persistence};

/// Fresh migrated database. One pooled connection keeps the in-memory
/// database alive for the whole test.
pub async fn setup() -> Persistence {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    Persistence::new(db)
}

/// Fixed base time so orderings by time are predictable
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(n)
}

pub fn user_model(email: &str) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        email: email.to_string(),
        nick_name: None,
        created_at: base_time(),
        modified_at: base_time(),
    }
}

pub fn activity_model(title: &str, clicks: i32, created_at: DateTime<Utc>) -> activity::Model {
    activity::Model {
        id: Uuid::new_v4(),
        title: title.to_string(),
        subtitle: None,
        content: format!("About {}", title),
        activity_clicked_count: clicks,
        created_at,
        modified_at: created_at,
    }
}

pub fn tag_model(text: &str) -> tag::Model {
    tag::Model {
        id: Uuid::new_v4(),
        text: text.to_string(),
        kind: "general".to_string(),
        tag_click_count: 0,
        created_at: base_time(),
        modified_at: base_time(),
    }
}

pub async fn seed_user(persistence: &Persistence, email: &str) -> user::Model {
    let model = user_model(email);
    let uow = persistence.begin();
    uow.repository::<user::Entity>().add(model.clone());
    uow.commit().await.expect("seed user");
    model
}

pub async fn seed_activities(
    persistence: &Persistence,
    models: Vec<activity::Model>,
) -> Vec<activity::Model> {
    let uow = persistence.begin();
    uow.repository::<activity::Entity>().add_range(models.clone());
    uow.commit().await.expect("seed activities");
    models
}

pub async fn seed_activity(persistence: &Persistence, title: &str, clicks: i32) -> activity::Model {
    seed_activities(persistence, vec![activity_model(title, clicks, base_time())])
        .await
        .remove(0)
}

/// Link stored tags to an activity
pub async fn link_tags(persistence: &Persistence, activity_id: Uuid, tags: &[&tag::Model]) {
    let uow = persistence.begin();
    for tag in tags {
        uow.repository::<activity_tag::Entity>().add(activity_tag::Model {
            activity_id,
            tag_id: tag.id,
        });
    }
    uow.commit().await.expect("seed activity tags");
}

pub async fn store_tags(persistence: &Persistence, texts: &[&str]) -> Vec<tag::Model> {
    let models: Vec<tag::Model> = texts.iter().map(|t| tag_model(t)).collect();
    let uow = persistence.begin();
    uow.repository::<tag::Entity>().add_range(models.clone());
    uow.commit().await.expect("seed tags");
    models
}

pub async fn seed_status(
    persistence: &Persistence,
    user_id: Uuid,
    activity_id: Uuid,
    status: &str,
    changed_at: DateTime<Utc>,
) {
    let uow = persistence.begin();
    uow.repository::<activity_status::Entity>()
        .add(activity_status::Model {
            id: 0,
            user_id,
            activity_id,
            status: status.to_string(),
            created_at: changed_at,
            modified_at: changed_at,
        });
    uow.commit().await.expect("seed status");
}

pub async fn seed_comment(
    persistence: &Persistence,
    activity_id: Uuid,
    user_id: Uuid,
    rate: i32,
    sequence: i32,
) -> comment::Model {
    let model = comment::Model {
        id: Uuid::new_v4(),
        activity_id,
        user_id,
        content: format!("Rated {}", rate),
        rate,
        sequence,
        created_at: minutes(i64::from(sequence)),
        modified_at: minutes(i64::from(sequence)),
    };
    let uow = persistence.begin();
    uow.repository::<comment::Entity>().add(model.clone());
    uow.commit().await.expect("seed comment");
    model
}
