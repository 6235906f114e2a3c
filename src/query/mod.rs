//! Query composition engine.
//!
//! Turns free-text list parameters (sort key, direction, page, page size)
//! into one deterministic ordering and a page slice. Sorting keys are either
//! semantic selectors built by the services or names resolved against the
//! sortable fields of a type.

mod compose;
mod page;
mod sort;

pub use compose::{paginate, paginate_select};
pub use page::{total_pages, Page, PageSpec};
pub use sort::{
    resolve_column, ColumnSort, Direction, KeySelector, SortField, SortSpec, SortValue, Sortable,
};
