//! Generic repository over a SeaORM entity.
//!
//! Reads go straight to the connection. Writes are staged into the change set
//! shared by every repository of the same unit of work and only reach the
//! database when the unit of work commits, inside a single transaction.

use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IdenStatic, IntoActiveModel, Iterable, ModelTrait,
    PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, Related, Select, Value,
};

use crate::errors::AppResult;
use crate::infra::unit_of_work::RepositorySet;

/// A persisted model exposing its typed, immutable key.
pub trait EntityRef {
    type Key: Clone + PartialEq + Debug + Send + Sync;

    fn key(&self) -> Self::Key;
}

/// Entity types a unit of work can hand out repositories for.
///
/// Each implementor owns one statically known slot of the [`RepositorySet`].
pub trait Persisted: EntityTrait + Send + Sync + 'static {
    /// Table name used in logs and errors
    const NAME: &'static str;

    type Active: ActiveModelTrait<Entity = Self>
        + ActiveModelBehavior
        + From<Self::Model>
        + Send
        + Sync
        + 'static;

    fn repository_slot(set: &RepositorySet) -> &once_cell::sync::OnceCell<Repository<Self>>;
}

/// Kind of staged mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

type PendingOp =
    Box<dyn for<'t> FnOnce(&'t DatabaseTransaction) -> BoxFuture<'t, Result<(), DbErr>> + Send>;

fn pending_op<F>(op: F) -> PendingOp
where
    F: for<'t> FnOnce(&'t DatabaseTransaction) -> BoxFuture<'t, Result<(), DbErr>>
        + Send
        + 'static,
{
    Box::new(op)
}

/// One staged mutation, applied at commit time.
pub struct PendingChange {
    pub entity: &'static str,
    pub kind: ChangeKind,
    apply: PendingOp,
}

impl PendingChange {
    pub(crate) async fn apply(self, txn: &DatabaseTransaction) -> Result<(), DbErr> {
        (self.apply)(txn).await
    }
}

impl Debug for PendingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingChange")
            .field("entity", &self.entity)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered mutations staged by every repository of one unit of work.
#[derive(Clone, Default)]
pub struct ChangeSet(Arc<Mutex<Vec<PendingChange>>>);

impl ChangeSet {
    fn lock(&self) -> MutexGuard<'_, Vec<PendingChange>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, change: PendingChange) {
        self.lock().push(change);
    }

    /// Take every staged change, leaving the set empty
    pub(crate) fn drain(&self) -> Vec<PendingChange> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Repository handle scoped to one unit of work.
pub struct Repository<E: Persisted> {
    db: DatabaseConnection,
    changes: ChangeSet,
    local: Mutex<Vec<E::Model>>,
}

impl<E: Persisted> Repository<E> {
    pub(crate) fn new(db: DatabaseConnection, changes: ChangeSet) -> Self {
        Self {
            db,
            changes,
            local: Mutex::new(Vec::new()),
        }
    }

    /// Connection used for reads
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Staging
    // =========================================================================

    /// Stage an insert of `model`
    pub fn add(&self, model: E::Model)
    where
        E::Model: IntoActiveModel<E::Active>,
    {
        let mut active = E::Active::from(model.clone());
        for column in E::Column::iter() {
            active.reset(column);
        }
        if <E::PrimaryKey as PrimaryKeyTrait>::auto_increment() {
            for key in E::PrimaryKey::iter() {
                active.not_set(key.into_column());
            }
        }

        tracing::debug!(entity = E::NAME, "Staged insert");
        self.stage(
            ChangeKind::Insert,
            pending_op(move |txn| {
                Box::pin(async move {
                    E::insert(active).exec_without_returning(txn).await?;
                    Ok(())
                })
            }),
        );
        self.local_guard().push(model);
    }

    /// Stage inserts for every model, in order
    pub fn add_range<I>(&self, models: I)
    where
        I: IntoIterator<Item = E::Model>,
        E::Model: IntoActiveModel<E::Active>,
    {
        for model in models {
            self.add(model);
        }
    }

    /// Stage a full update: every non-key column is written
    pub fn update(&self, model: E::Model) {
        let columns: Vec<E::Column> = E::Column::iter()
            .filter(|column| !is_primary_key::<E>(column))
            .collect();
        self.stage_update(model, &columns);
    }

    /// Stage a partial update touching only `columns`; other columns keep
    /// their stored values even if `model` differs. No columns is a no-op.
    pub fn update_fields(&self, model: E::Model, columns: &[E::Column]) {
        if columns.is_empty() {
            return;
        }
        self.stage_update(model, columns);
    }

    fn stage_update(&self, model: E::Model, columns: &[E::Column]) {
        let values: Vec<(E::Column, Value)> = columns
            .iter()
            .filter(|column| !is_primary_key::<E>(column))
            .map(|column| (*column, model.get(*column)))
            .collect();
        if values.is_empty() {
            return;
        }
        let key = key_values::<E>(&model);
        let entity = E::NAME;

        tracing::debug!(entity, columns = values.len(), "Staged update");
        self.stage(
            ChangeKind::Update,
            pending_op(move |txn| {
                Box::pin(async move {
                    let mut update = E::update_many();
                    for (column, value) in values {
                        update = update.col_expr(column, SimpleExpr::Value(value));
                    }
                    let result = update.filter(key_condition::<E>(key)).exec(txn).await?;
                    if result.rows_affected == 0 {
                        return Err(DbErr::RecordNotUpdated);
                    }
                    Ok(())
                })
            }),
        );
        self.track(model);
    }

    /// Stage a delete of `model`
    pub fn delete(&self, model: &E::Model) {
        let key = key_values::<E>(model);
        let entity = E::NAME;

        tracing::debug!(entity, "Staged delete");
        self.untrack(&key);
        self.stage(
            ChangeKind::Delete,
            pending_op(move |txn| {
                Box::pin(async move {
                    let result = E::delete_many()
                        .filter(key_condition::<E>(key))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(DbErr::RecordNotFound(format!(
                            "{} row to delete no longer exists",
                            entity
                        )));
                    }
                    Ok(())
                })
            }),
        );
    }

    /// Stage deletes for every model, in order
    pub fn remove_range(&self, models: &[E::Model]) {
        for model in models {
            self.delete(model);
        }
    }

    fn stage(&self, kind: ChangeKind, apply: PendingOp) {
        self.changes.push(PendingChange {
            entity: E::NAME,
            kind,
            apply,
        });
    }

    // =========================================================================
    // Identity map
    // =========================================================================

    fn local_guard(&self) -> MutexGuard<'_, Vec<E::Model>> {
        self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn track(&self, model: E::Model) {
        let key = key_values::<E>(&model);
        let mut local = self.local_guard();
        match local.iter_mut().find(|m| key_values::<E>(m) == key) {
            Some(existing) => *existing = model,
            None => local.push(model),
        }
    }

    fn untrack(&self, key: &[Value]) {
        self.local_guard()
            .retain(|m| key_values::<E>(m).as_slice() != key);
    }

    /// Attach a model loaded elsewhere to this scope without staging a change
    pub fn attach(&self, model: E::Model) {
        self.track(model);
    }

    /// Models attached to this scope: loaded by key, added, or updated.
    ///
    /// Includes rows that are staged but not yet committed.
    pub fn local(&self) -> Vec<E::Model> {
        self.local_guard().clone()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Select over every row of `E`
    pub fn query(&self) -> Select<E> {
        E::find()
    }

    /// Select over the rows matching `condition`
    pub fn query_where(&self, condition: Condition) -> Select<E> {
        E::find().filter(condition)
    }

    pub async fn all(&self) -> AppResult<Vec<E::Model>> {
        Ok(E::find().all(&self.db).await?)
    }

    pub async fn find(&self, condition: Condition) -> AppResult<Vec<E::Model>> {
        Ok(self.query_where(condition).all(&self.db).await?)
    }

    pub async fn first(&self, condition: Condition) -> AppResult<Option<E::Model>> {
        Ok(self.query_where(condition).one(&self.db).await?)
    }

    pub async fn count(&self, condition: Condition) -> AppResult<u64>
    where
        E::Model: Sync,
    {
        Ok(self.query_where(condition).count(&self.db).await?)
    }

    /// Load a row by primary key and attach it to this scope.
    ///
    /// A missing row is `None`, never an error.
    pub async fn get_by_id(
        &self,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> AppResult<Option<E::Model>> {
        let found = E::find_by_id(id).one(&self.db).await?;
        if let Some(model) = &found {
            self.track(model.clone());
        }
        Ok(found)
    }

    /// Explicitly load the collection of `R` related to an already loaded model
    pub async fn load_related<R>(&self, model: &E::Model, related: R) -> AppResult<Vec<R::Model>>
    where
        R: EntityTrait,
        E: Related<R>,
    {
        Ok(model.find_related(related).all(&self.db).await?)
    }

    /// Rows matching `condition`, each with its related `R` rows eagerly loaded
    pub async fn query_with_related<R>(
        &self,
        condition: Condition,
        related: R,
    ) -> AppResult<Vec<(E::Model, Vec<R::Model>)>>
    where
        R: EntityTrait,
        E: Related<R>,
    {
        Ok(self
            .query_where(condition)
            .find_with_related(related)
            .all(&self.db)
            .await?)
    }
}

impl<E: Persisted> Repository<E>
where
    E::Model: EntityRef,
{
    /// Attached model with the given key, if any
    pub fn find_local(&self, key: &<E::Model as EntityRef>::Key) -> Option<E::Model> {
        self.local_guard().iter().find(|m| &m.key() == key).cloned()
    }
}

impl<E: Persisted> Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::NAME)
            .field("tracked", &self.local_guard().len())
            .finish()
    }
}

fn is_primary_key<E: EntityTrait>(column: &E::Column) -> bool {
    E::PrimaryKey::iter().any(|key| key.into_column().as_str() == column.as_str())
}

fn key_values<E: EntityTrait>(model: &E::Model) -> Vec<Value> {
    E::PrimaryKey::iter()
        .map(|key| model.get(key.into_column()))
        .collect()
}

fn key_condition<E: EntityTrait>(values: Vec<Value>) -> Condition {
    E::PrimaryKey::iter()
        .zip(values)
        .fold(Condition::all(), |condition, (key, value)| {
            condition.add(key.into_column().eq(value))
        })
}
