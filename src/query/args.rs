//! Arguments shared by the `find_*` delegate methods: ordering and pagination.

use sea_orm::{ColumnTrait, Order};
use serde::Deserialize;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<C> {
    pub column: C,
    pub order: SortOrder,
}

impl<C: ColumnTrait> OrderBy<C> {
    #[must_use]
    pub const fn asc(column: C) -> Self {
        Self {
            column,
            order: SortOrder::Asc,
        }
    }

    #[must_use]
    pub const fn desc(column: C) -> Self {
        Self {
            column,
            order: SortOrder::Desc,
        }
    }
}

/// Arguments of `find_many` / `find_first`.
///
/// * `where_input` - rows to consider; the default matches everything
/// * `order_by` - applied in order, the primary key is always the final tiebreaker
/// * `cursor` - start the page at this record (inclusive), following `order_by`
/// * `skip` - rows dropped after the cursor is applied
/// * `take` - page size; falls back to the configured default and is capped by
///   the configured maximum
#[derive(Debug, Clone)]
pub struct FindManyArgs<W, U, C> {
    pub where_input: W,
    pub order_by: Vec<OrderBy<C>>,
    pub cursor: Option<U>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<W: Default, U, C> Default for FindManyArgs<W, U, C> {
    fn default() -> Self {
        Self {
            where_input: W::default(),
            order_by: Vec::new(),
            cursor: None,
            skip: None,
            take: None,
        }
    }
}

impl<W: Default, U, C> FindManyArgs<W, U, C> {
    /// Arguments matching `where_input` with no ordering or paging.
    #[must_use]
    pub fn filtered(where_input: W) -> Self {
        Self {
            where_input,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy<C>) -> Self {
        self.order_by.push(order);
        self
    }

    #[must_use]
    pub fn cursor(mut self, cursor: U) -> Self {
        self.cursor = Some(cursor);
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub const fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }
}

/// Page size limits applied to every `find_many`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Rows returned when the caller gives no `take`
    pub default_take: u64,
    /// Upper bound for any `take`
    pub max_take: u64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_take: 100,
            max_take: 1000,
        }
    }
}

impl QueryLimits {
    /// Resolves the effective page size for a requested `take`.
    #[must_use]
    pub fn resolve(&self, take: Option<u64>) -> u64 {
        take.unwrap_or(self.default_take).min(self.max_take)
    }
}
