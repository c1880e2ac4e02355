//! Result rows of `aggregate` and `group_by`.
//!
//! Only numeric columns can be aggregated. Values are computed as double
//! precision, so integer columns such as `file_size` go through the same path
//! as amounts.

use sea_orm::{
    ColumnTrait, ColumnType, FromQueryResult, QueryResult, TryGetable,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use serde::Serialize;

pub(crate) const COUNT_ALIAS: &str = "count";
pub(crate) const SUM_ALIAS: &str = "sum";
pub(crate) const AVG_ALIAS: &str = "avg";
pub(crate) const MIN_ALIAS: &str = "min";
pub(crate) const MAX_ALIAS: &str = "max";
pub(crate) const KEY_ALIAS: &str = "group_key";

/// `COUNT(*)`, `SUM`, `AVG`, `MIN` and `MAX` of one column over the matched rows.
///
/// The numeric parts are `None` when no row matched.
#[derive(Debug, Clone, Default, PartialEq, FromQueryResult, Serialize)]
pub struct AggregateResult {
    pub count: i64,
    pub sum: Option<f64>,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One group of a `group_by` query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupByRow<K> {
    /// Value of the grouping column
    pub key: K,
    pub count: i64,
    /// Aggregates of the requested field, `None` when no field was requested
    pub sum: Option<f64>,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl<K: TryGetable> FromQueryResult for GroupByRow<K> {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, sea_orm::DbErr> {
        Ok(Self {
            key: res.try_get(pre, KEY_ALIAS)?,
            count: res.try_get(pre, COUNT_ALIAS)?,
            sum: res.try_get(pre, SUM_ALIAS)?,
            avg: res.try_get(pre, AVG_ALIAS)?,
            min: res.try_get(pre, MIN_ALIAS)?,
            max: res.try_get(pre, MAX_ALIAS)?,
        })
    }
}

/// Group key and row count, selected when no field is aggregated
pub(crate) struct GroupCountRow<K> {
    key: K,
    count: i64,
}

impl<K: TryGetable> FromQueryResult for GroupCountRow<K> {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, sea_orm::DbErr> {
        Ok(Self {
            key: res.try_get(pre, KEY_ALIAS)?,
            count: res.try_get(pre, COUNT_ALIAS)?,
        })
    }
}

impl<K> GroupCountRow<K> {
    pub(crate) fn into_group(self) -> GroupByRow<K> {
        GroupByRow {
            key: self.key,
            count: self.count,
            sum: None,
            avg: None,
            min: None,
            max: None,
        }
    }
}

/// Whether `column` holds numbers that `SUM` and `AVG` make sense over.
pub(crate) fn is_numeric<C: ColumnTrait>(column: C) -> bool {
    matches!(
        column.def().get_column_type(),
        ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned
            | ColumnType::Float
            | ColumnType::Double
            | ColumnType::Decimal(_)
            | ColumnType::Money(_)
    )
}

/// `COUNT(*)`
pub(crate) fn count_expr() -> SimpleExpr {
    Expr::cust("COUNT(*)")
}

/// The four numeric aggregates of `column`, paired with their aliases.
pub(crate) fn numeric_exprs<C: ColumnTrait + Copy>(column: C) -> [(SimpleExpr, &'static str); 4] {
    let value = || Expr::col(column).cast_as(Alias::new("DOUBLE PRECISION"));
    [
        (Func::sum(value()).into(), SUM_ALIAS),
        (Func::avg(value()).into(), AVG_ALIAS),
        (Func::min(value()).into(), MIN_ALIAS),
        (Func::max(value()).into(), MAX_ALIAS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{donation, donation_proof, program};

    #[test]
    fn test_numeric_columns() {
        assert!(is_numeric(donation::Column::Amount));
        assert!(is_numeric(donation_proof::Column::FileSize));
        assert!(!is_numeric(program::Column::Name));
        assert!(!is_numeric(program::Column::CreatedAt));
        assert!(!is_numeric(donation::Column::Status));
    }
}
