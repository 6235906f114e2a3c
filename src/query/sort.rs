//! Sort specifications: directions, sort values and key selectors.
//!
//! A key selector extracts a comparable [`SortValue`] from an item. Selectors
//! are either fixed in code (semantic keys such as the popularity counter) or
//! resolved at request time from a client-supplied name through the static
//! [`Sortable`] registry of the item type. SQL-side sorting resolves names
//! against the SeaORM column enum instead, see [`ColumnSort`].

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{EntityTrait, IdenStatic, Iterable, Order};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ORDER_ASCENDING, ORDER_DESCENDING};
use crate::errors::{AppError, AppResult};

/// Sort direction, applied uniformly to every key of a [`SortSpec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => ORDER_ASCENDING,
            Direction::Descending => ORDER_DESCENDING,
        }
    }

    /// Orient an ascending comparison result
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    /// Parse an optional orderBy value, falling back to descending
    pub fn parse_or_default(value: Option<&str>) -> AppResult<Self> {
        value.map_or(Ok(Direction::default()), str::parse)
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ORDER_ASCENDING) {
            Ok(Direction::Ascending)
        } else if s.eq_ignore_ascii_case(ORDER_DESCENDING) {
            Ok(Direction::Descending)
        } else {
            Err(AppError::InvalidSortDirection(s.to_string()))
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Ascending => Order::Asc,
            Direction::Descending => Order::Desc,
        }
    }
}

/// Comparable value produced by a key selector.
///
/// Values of the same selector share a variant; `Null` sorts first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
    Uuid(Uuid),
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        SortValue::Bool(value)
    }
}

impl From<i32> for SortValue {
    fn from(value: i32) -> Self {
        SortValue::Int(i64::from(value))
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Int(value)
    }
}

impl From<usize> for SortValue {
    fn from(value: usize) -> Self {
        SortValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<&String> for SortValue {
    fn from(value: &String) -> Self {
        SortValue::Text(value.clone())
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        SortValue::Time(value)
    }
}

impl From<Uuid> for SortValue {
    fn from(value: Uuid) -> Self {
        SortValue::Uuid(value)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SortValue::Null, Into::into)
    }
}

/// Named function extracting a sort value from an item.
pub struct KeySelector<T> {
    name: Cow<'static, str>,
    key: Arc<dyn Fn(&T) -> SortValue + Send + Sync>,
}

impl<T> KeySelector<T> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, key: F) -> Self
    where
        F: Fn(&T) -> SortValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            key: Arc::new(key),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extract(&self, item: &T) -> SortValue {
        (self.key)(item)
    }
}

impl<T> Clone for KeySelector<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key: Arc::clone(&self.key),
        }
    }
}

impl<T> fmt::Debug for KeySelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeySelector").field(&self.name).finish()
    }
}

/// Entry of a type's sort-key registry.
pub struct SortField<T: 'static> {
    pub name: &'static str,
    pub key: fn(&T) -> SortValue,
}

/// Types whose fields can be named as sort keys by clients.
pub trait Sortable: Sized + 'static {
    /// Type name used in error messages
    const ENTITY: &'static str;

    /// Registry of sortable fields
    fn sort_fields() -> &'static [SortField<Self>];

    /// Key used when no selector is given and as the final tie-break
    fn natural_key(&self) -> SortValue;

    /// Resolve a client-supplied field name (case-insensitive, underscores ignored)
    fn resolve_sort_key(name: &str) -> AppResult<KeySelector<Self>> {
        let wanted = normalize_key(name);
        Self::sort_fields()
            .iter()
            .find(|field| normalize_key(field.name) == wanted)
            .map(|field| {
                let key = field.key;
                KeySelector::new(field.name, move |item: &Self| key(item))
            })
            .ok_or_else(|| AppError::invalid_sort_key(name, Self::ENTITY))
    }

    /// Names accepted by [`Sortable::resolve_sort_key`]
    fn sort_keys() -> Vec<&'static str> {
        Self::sort_fields().iter().map(|field| field.name).collect()
    }
}

/// Ordered key selectors sharing a single direction.
#[derive(Debug, Clone)]
pub struct SortSpec<T> {
    selectors: Vec<KeySelector<T>>,
    direction: Direction,
}

impl<T> SortSpec<T> {
    pub fn new(direction: Direction) -> Self {
        Self {
            selectors: Vec::new(),
            direction,
        }
    }

    /// Append a tie-break key
    pub fn then_by(mut self, selector: KeySelector<T>) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Insert a ranking key ahead of every key added so far
    pub fn rank_first(mut self, selector: KeySelector<T>) -> Self {
        self.selectors.insert(0, selector);
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn selectors(&self) -> &[KeySelector<T>] {
        &self.selectors
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn key_names(&self) -> Vec<&str> {
        self.selectors.iter().map(KeySelector::name).collect()
    }
}

impl<T: Sortable> SortSpec<T> {
    /// Append a key resolved dynamically from its name
    pub fn then_by_name(self, name: &str) -> AppResult<Self> {
        let selector = T::resolve_sort_key(name)?;
        Ok(self.then_by(selector))
    }
}

/// Column ordering for selects executed by the database.
#[derive(Debug, Clone)]
pub struct ColumnSort<E: EntityTrait> {
    columns: Vec<E::Column>,
    direction: Direction,
}

impl<E: EntityTrait> ColumnSort<E> {
    pub fn new(direction: Direction) -> Self {
        Self {
            columns: Vec::new(),
            direction,
        }
    }

    pub fn then_by(mut self, column: E::Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a column resolved from a client-supplied name
    pub fn then_by_name(self, name: &str) -> AppResult<Self> {
        let column = resolve_column::<E>(name)?;
        Ok(self.then_by(column))
    }

    pub fn columns(&self) -> &[E::Column] {
        &self.columns
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Find the column of `E` whose name matches, ignoring case and underscores.
pub fn resolve_column<E: EntityTrait>(name: &str) -> AppResult<E::Column> {
    let wanted = normalize_key(name);
    E::Column::iter()
        .find(|column| normalize_key(column.as_str()) == wanted)
        .ok_or_else(|| AppError::invalid_sort_key(name, E::default().as_str()))
}

fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        title: String,
        score: i32,
    }

    impl Sortable for Item {
        const ENTITY: &'static str = "Item";

        fn sort_fields() -> &'static [SortField<Self>] {
            const FIELDS: &[SortField<Item>] = &[
                SortField {
                    name: "Title",
                    key: |item| SortValue::from(&item.title),
                },
                SortField {
                    name: "Score",
                    key: |item| SortValue::from(item.score),
                },
            ];
            FIELDS
        }

        fn natural_key(&self) -> SortValue {
            SortValue::from(&self.title)
        }
    }

    #[test]
    fn test_direction_parse_is_case_insensitive() {
        assert_eq!("Descending".parse::<Direction>().unwrap(), Direction::Descending);
        assert_eq!("ASCENDING".parse::<Direction>().unwrap(), Direction::Ascending);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(AppError::InvalidSortDirection(_))
        ));
    }

    #[test]
    fn test_direction_defaults_to_descending() {
        assert_eq!(Direction::parse_or_default(None).unwrap(), Direction::Descending);
    }

    #[test]
    fn test_null_sorts_before_values() {
        assert!(SortValue::from(None::<i32>) < SortValue::from(Some(0)));
        assert!(SortValue::from(2) < SortValue::from(10));
    }

    #[test]
    fn test_resolve_sort_key_ignores_case_and_underscores() {
        let item = Item {
            title: "a".into(),
            score: 7,
        };

        for name in ["Score", "score", "SCORE", "s_core"] {
            let selector = Item::resolve_sort_key(name).unwrap();
            assert_eq!(selector.name(), "Score");
            assert_eq!(selector.extract(&item), SortValue::Int(7));
        }
    }

    #[test]
    fn test_resolve_unknown_key_fails() {
        let err = Item::resolve_sort_key("Colour").unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidSortKey { ref key, ref entity } if key == "Colour" && entity == "Item"
        ));
    }

    #[test]
    fn test_rank_first_goes_ahead_of_existing_keys() {
        let spec = SortSpec::<Item>::new(Direction::Descending)
            .then_by_name("Title")
            .unwrap()
            .rank_first(KeySelector::new("Rank", |item: &Item| SortValue::from(item.score)));

        assert_eq!(spec.key_names(), vec!["Rank", "Title"]);
        assert_eq!(spec.direction(), Direction::Descending);
    }
}
