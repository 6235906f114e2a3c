//! Unit of Work pattern implementation.
//!
//! A [`UnitOfWork`] is opened per request by [`Persistence`]. It hands out one
//! repository per entity type, created on first use and reused for the rest of
//! the scope, and flushes every change staged through those repositories in a
//! single transaction on [`UnitOfWork::commit`].

use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Related, TransactionTrait};

use super::repositories::entities::{
    activity, activity_status, activity_tag, branch, branch_location, comment, location,
    search_history, tag, user,
};
use super::repositories::{ChangeSet, PendingChange, Persisted, Repository};
use crate::errors::{AppError, AppResult};

/// Lazily created repositories of one scope, one slot per entity type.
#[derive(Default)]
pub struct RepositorySet {
    users: OnceCell<Repository<user::Entity>>,
    activities: OnceCell<Repository<activity::Entity>>,
    tags: OnceCell<Repository<tag::Entity>>,
    activity_tags: OnceCell<Repository<activity_tag::Entity>>,
    activity_statuses: OnceCell<Repository<activity_status::Entity>>,
    comments: OnceCell<Repository<comment::Entity>>,
    search_histories: OnceCell<Repository<search_history::Entity>>,
    branches: OnceCell<Repository<branch::Entity>>,
    locations: OnceCell<Repository<location::Entity>>,
    branch_locations: OnceCell<Repository<branch_location::Entity>>,
}

macro_rules! persisted {
    ($($module:ident => $slot:ident),+ $(,)?) => {
        $(
            impl Persisted for $module::Entity {
                const NAME: &'static str = stringify!($slot);

                type Active = $module::ActiveModel;

                fn repository_slot(set: &RepositorySet) -> &OnceCell<Repository<Self>> {
                    &set.$slot
                }
            }
        )+
    };
}

persisted! {
    user => users,
    activity => activities,
    tag => tags,
    activity_tag => activity_tags,
    activity_status => activity_statuses,
    comment => comments,
    search_history => search_histories,
    branch => branches,
    location => locations,
    branch_location => branch_locations,
}

/// Application-level factory owning the connection pool.
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a new unit of work scope
    pub fn begin(&self) -> UnitOfWork {
        UnitOfWork::new(self.db.clone())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// One request scope over the database.
pub struct UnitOfWork {
    db: DatabaseConnection,
    changes: ChangeSet,
    repositories: RepositorySet,
    disposed: AtomicBool,
}

impl UnitOfWork {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            changes: ChangeSet::default(),
            repositories: RepositorySet::default(),
            disposed: AtomicBool::new(false),
        }
    }

    /// Repository for `E`; every call within this scope returns the same instance.
    pub fn repository<E: Persisted>(&self) -> &Repository<E> {
        E::repository_slot(&self.repositories).get_or_init(|| {
            tracing::debug!(entity = E::NAME, "Creating repository");
            Repository::new(self.db.clone(), self.changes.clone())
        })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Number of changes staged and not yet committed
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    /// Flush every staged change in one transaction.
    ///
    /// Either all changes are applied or none are. The staged set is consumed
    /// by the attempt, so a failed commit leaves nothing pending. Returns the
    /// number of applied changes.
    pub async fn commit(&self) -> AppResult<usize> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(AppError::internal("Commit on a disposed unit of work"));
        }

        let pending = self.changes.drain();
        if pending.is_empty() {
            return Ok(0);
        }
        let count = pending.len();

        let txn = self.db.begin().await.map_err(AppError::CommitFailure)?;
        let outcome = apply_all(&txn, pending).await;

        match outcome {
            Ok(()) => {
                txn.commit().await.map_err(AppError::CommitFailure)?;
                tracing::info!(changes = count, "Unit of work committed");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, changes = count, "Rolling back unit of work");
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(AppError::CommitFailure(e))
            }
        }
    }

    /// Load the `R` rows related to an already loaded `E` model
    pub async fn load_related<E, R>(&self, model: &E::Model, related: R) -> AppResult<Vec<R::Model>>
    where
        E: Persisted + Related<R>,
        R: EntityTrait,
    {
        self.repository::<E>().load_related(model, related).await
    }

    /// [`UnitOfWork::load_related`] for several models, results in input order
    pub async fn load_related_many<E, R>(
        &self,
        models: &[E::Model],
        related: R,
    ) -> AppResult<Vec<Vec<R::Model>>>
    where
        E: Persisted + Related<R>,
        R: EntityTrait,
    {
        let repository = self.repository::<E>();
        let mut loaded = Vec::with_capacity(models.len());
        for model in models {
            loaded.push(repository.load_related(model, related).await?);
        }
        Ok(loaded)
    }

    /// Discard staged changes; further commits fail. Safe to call repeatedly.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let discarded = self.changes.drain().len();
        if discarded > 0 {
            tracing::debug!(discarded, "Disposed unit of work with uncommitted changes");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn apply_all(txn: &DatabaseTransaction, pending: Vec<PendingChange>) -> Result<(), DbErr> {
    for change in pending {
        tracing::debug!(entity = change.entity, kind = ?change.kind, "Applying change");
        change.apply(txn).await?;
    }
    Ok(())
}
