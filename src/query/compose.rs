//! Page composition executors.
//!
//! [`paginate`] orders and slices a materialized collection; it is used when a
//! key is derived from related data (tag overlap, status timestamps) and cannot
//! be expressed as a column. [`paginate_select`] pushes plain column orderings
//! into the database through SeaORM's paginator.

use sea_orm::{
    ConnectionTrait, EntityTrait, Iterable, Order, PaginatorTrait, PrimaryKeyToColumn,
    QueryOrder, Select,
};

use super::page::{Page, PageSpec};
use super::sort::{ColumnSort, SortSpec, SortValue, Sortable};
use crate::errors::AppResult;

/// Order `items` by `sort`, then cut out the requested page.
///
/// The natural key of `T` is always the last key so that equal items keep
/// a fixed relative order and consecutive pages never overlap.
pub fn paginate<T, I>(items: I, sort: &SortSpec<T>, page: PageSpec) -> AppResult<Page<T>>
where
    T: Sortable,
    I: IntoIterator<Item = T>,
{
    let items: Vec<T> = items.into_iter().collect();
    let total_count = items.len() as u64;
    let total_pages = page.check(total_count)?;

    let direction = sort.direction();
    let mut keyed: Vec<(Vec<SortValue>, T)> = items
        .into_iter()
        .map(|item| (sort_keys(sort, &item), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| direction.apply(a.cmp(b)));

    let items = keyed
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.count_per_page() as usize)
        .map(|(_, item)| item)
        .collect();

    Ok(Page {
        items,
        total_count,
        total_pages,
    })
}

fn sort_keys<T: Sortable>(sort: &SortSpec<T>, item: &T) -> Vec<SortValue> {
    let mut keys: Vec<SortValue> = sort
        .selectors()
        .iter()
        .map(|selector| selector.extract(item))
        .collect();
    keys.push(item.natural_key());
    keys
}

/// Order `select` by the sort columns plus the primary key and fetch one page.
pub async fn paginate_select<E, C>(
    db: &C,
    select: Select<E>,
    sort: &ColumnSort<E>,
    page: PageSpec,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
    C: ConnectionTrait,
{
    let order = Order::from(sort.direction());
    let mut select = select;
    for column in sort.columns() {
        select = select.order_by(*column, order.clone());
    }
    for key in E::PrimaryKey::iter() {
        select = select.order_by(key.into_column(), order.clone());
    }

    let paginator = select.paginate(db, page.count_per_page());
    let total_count = paginator.num_items().await?;
    let total_pages = page.check(total_count)?;
    let items = paginator.fetch_page(page.page() - 1).await?;

    tracing::debug!(
        page = page.page(),
        total_count,
        total_pages,
        "Fetched page from database"
    );

    Ok(Page {
        items,
        total_count,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Direction, KeySelector, SortField};
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: i64,
        clicks: i32,
        tags: Vec<&'static str>,
        title: &'static str,
    }

    impl Sortable for Entry {
        const ENTITY: &'static str = "Entry";

        fn sort_fields() -> &'static [SortField<Self>] {
            const FIELDS: &[SortField<Entry>] = &[
                SortField {
                    name: "Id",
                    key: |e| SortValue::from(e.id),
                },
                SortField {
                    name: "Clicks",
                    key: |e| SortValue::from(e.clicks),
                },
                SortField {
                    name: "Title",
                    key: |e| SortValue::from(e.title),
                },
            ];
            FIELDS
        }

        fn natural_key(&self) -> SortValue {
            SortValue::from(self.id)
        }
    }

    fn entry(id: i64, clicks: i32) -> Entry {
        Entry {
            id,
            clicks,
            tags: Vec::new(),
            title: "entry",
        }
    }

    fn trend() -> KeySelector<Entry> {
        KeySelector::new("Trend", |e: &Entry| SortValue::from(e.clicks))
    }

    fn overlap(requested: &'static [&'static str]) -> KeySelector<Entry> {
        KeySelector::new("TagOverlap", move |e: &Entry| {
            SortValue::from(e.tags.iter().filter(|t| requested.contains(*t)).count())
        })
    }

    #[test]
    fn test_trend_descending_over_three_pages() {
        let entries: Vec<Entry> = (1..=25).map(|i| entry(i, (i * 3) as i32)).collect();
        let sort = SortSpec::new(Direction::Descending).then_by(trend());

        let first = paginate(entries.clone(), &sort, PageSpec::new(1, 10).unwrap()).unwrap();
        let clicks: Vec<i32> = first.items.iter().map(|e| e.clicks).collect();
        assert_eq!(clicks, (16..=25).rev().map(|i| i * 3).collect::<Vec<i32>>());
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_count, 25);

        let last = paginate(entries, &sort, PageSpec::new(3, 10).unwrap()).unwrap();
        let ids: Vec<i64> = last.items.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_pages_cover_collection_exactly_once() {
        let entries: Vec<Entry> = (1..=23).map(|i| entry(i, (i % 4) as i32)).collect();
        let sort = SortSpec::new(Direction::Ascending).then_by(trend());

        let mut seen = HashSet::new();
        for page in 1..=3 {
            let result =
                paginate(entries.clone(), &sort, PageSpec::new(page, 10).unwrap()).unwrap();
            for item in result.items {
                assert!(seen.insert(item.id), "item {} appeared twice", item.id);
            }
        }
        assert_eq!(seen.len(), 23);
    }

    #[test]
    fn test_ties_are_deterministic() {
        let entries: Vec<Entry> = (1..=12).map(|i| entry(i, 1)).collect();
        let mut reversed = entries.clone();
        reversed.reverse();
        let sort = SortSpec::new(Direction::Descending).then_by(trend());
        let page = PageSpec::new(1, 5).unwrap();

        let a = paginate(entries, &sort, page).unwrap();
        let b = paginate(reversed, &sort, page).unwrap();

        assert_eq!(a.items, b.items);
    }

    #[test]
    fn test_empty_sort_uses_natural_key() {
        let entries = vec![entry(2, 0), entry(3, 0), entry(1, 0)];
        let sort = SortSpec::new(Direction::Ascending);

        let result = paginate(entries, &sort, PageSpec::new(1, 10).unwrap()).unwrap();
        let ids: Vec<i64> = result.items.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_tag_overlap_dominates_secondary_key() {
        let a = Entry {
            tags: vec!["x", "y"],
            ..entry(1, 1)
        };
        let b = Entry {
            tags: vec!["x"],
            ..entry(2, 100)
        };
        let c = Entry {
            tags: vec!["y"],
            ..entry(3, 50)
        };
        let sort = SortSpec::new(Direction::Descending)
            .then_by(trend())
            .rank_first(overlap(&["x", "y"]));

        let result = paginate(vec![c, b, a], &sort, PageSpec::new(1, 10).unwrap()).unwrap();
        let ids: Vec<i64> = result.items.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_dynamic_key_fails_before_paging() {
        let result = SortSpec::<Entry>::new(Direction::Descending).then_by_name("Colour");

        assert!(result.is_err());
    }

    #[test]
    fn test_dynamic_key_sorts_by_field() {
        let entries = vec![
            Entry {
                title: "beta",
                ..entry(1, 0)
            },
            Entry {
                title: "alpha",
                ..entry(2, 0)
            },
        ];
        let sort = SortSpec::new(Direction::Ascending)
            .then_by_name("title")
            .unwrap();

        let result = paginate(entries, &sort, PageSpec::new(1, 10).unwrap()).unwrap();

        assert_eq!(result.items[0].title, "alpha");
    }

    #[test]
    fn test_page_beyond_total_fails_with_both_numbers() {
        let entries: Vec<Entry> = (1..=21).map(|i| entry(i, 0)).collect();
        let sort = SortSpec::new(Direction::Descending);

        let short = paginate(entries.clone(), &sort, PageSpec::new(3, 10).unwrap()).unwrap();
        assert_eq!(short.items.len(), 1);

        let err = paginate(entries, &sort, PageSpec::new(4, 10).unwrap()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("(4)") && msg.contains("(3)"));
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let sort = SortSpec::<Entry>::new(Direction::Descending);

        let result = paginate(Vec::new(), &sort, PageSpec::new(1, 10).unwrap()).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.total_count, 0);
    }
}
