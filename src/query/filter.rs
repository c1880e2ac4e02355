//! Column filters used by the `*WhereInput` types.
//!
//! A filter holds any combination of comparisons; all of them must hold for a
//! row to match. An empty filter matches every row.

use sea_orm::{ColumnTrait, Condition, Value, sea_query::LikeExpr};
use serde::Deserialize;

/// Comparison filter for numbers, booleans, timestamps and enums.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarFilter<T> {
    pub equals: Option<T>,
    pub not: Option<T>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    pub lt: Option<T>,
    pub lte: Option<T>,
    pub gt: Option<T>,
    pub gte: Option<T>,
    /// `Some(true)` matches only NULL, `Some(false)` only non-NULL
    pub is_null: Option<bool>,
}

impl<T> Default for ScalarFilter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not: None,
            in_list: None,
            not_in: None,
            lt: None,
            lte: None,
            gt: None,
            gte: None,
            is_null: None,
        }
    }
}

impl<T> ScalarFilter<T>
where
    T: Into<Value>,
{
    /// Matches rows where the column equals `value`.
    #[must_use]
    pub fn equals(value: T) -> Self {
        Self {
            equals: Some(value),
            ..Self::default()
        }
    }

    /// Matches rows where the column is one of `values`.
    #[must_use]
    pub fn one_of(values: Vec<T>) -> Self {
        Self {
            in_list: Some(values),
            ..Self::default()
        }
    }

    /// Matches rows where the column lies in `[low, high]`.
    #[must_use]
    pub fn between(low: T, high: T) -> Self {
        Self {
            gte: Some(low),
            lte: Some(high),
            ..Self::default()
        }
    }

    /// Matches rows where the column is strictly less than `value`.
    #[must_use]
    pub fn lt(value: T) -> Self {
        Self {
            lt: Some(value),
            ..Self::default()
        }
    }

    /// Matches rows where the column is strictly greater than `value`.
    #[must_use]
    pub fn gt(value: T) -> Self {
        Self {
            gt: Some(value),
            ..Self::default()
        }
    }

    /// Matches rows where the column is (or is not) NULL.
    #[must_use]
    pub fn null(is_null: bool) -> Self {
        Self {
            is_null: Some(is_null),
            ..Self::default()
        }
    }

    /// Builds the condition this filter expresses on `column`.
    pub fn into_condition<C: ColumnTrait>(self, column: C) -> Condition {
        let mut cond = Condition::all();
        if let Some(v) = self.equals {
            cond = cond.add(column.eq(v));
        }
        if let Some(v) = self.not {
            cond = cond.add(column.ne(v));
        }
        if let Some(vs) = self.in_list {
            cond = cond.add(column.is_in(vs));
        }
        if let Some(vs) = self.not_in {
            cond = cond.add(column.is_not_in(vs));
        }
        if let Some(v) = self.lt {
            cond = cond.add(column.lt(v));
        }
        if let Some(v) = self.lte {
            cond = cond.add(column.lte(v));
        }
        if let Some(v) = self.gt {
            cond = cond.add(column.gt(v));
        }
        if let Some(v) = self.gte {
            cond = cond.add(column.gte(v));
        }
        add_null_check(cond, column, self.is_null)
    }
}

/// Filter for text columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    pub equals: Option<String>,
    pub not: Option<String>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<String>>,
    pub not_in: Option<Vec<String>>,
    /// Substring match; `%` and `_` in the value match literally
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    /// `Some(true)` matches only NULL, `Some(false)` only non-NULL
    pub is_null: Option<bool>,
}

impl StringFilter {
    /// Matches rows where the column equals `value`.
    #[must_use]
    pub fn equals(value: impl Into<String>) -> Self {
        Self {
            equals: Some(value.into()),
            ..Self::default()
        }
    }

    /// Matches rows where the column contains `value`.
    #[must_use]
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn starts_with(value: impl Into<String>) -> Self {
        Self {
            starts_with: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn one_of<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            in_list: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Matches rows where the column is (or is not) NULL.
    #[must_use]
    pub fn null(is_null: bool) -> Self {
        Self {
            is_null: Some(is_null),
            ..Self::default()
        }
    }

    /// Builds the condition this filter expresses on `column`.
    pub fn into_condition<C: ColumnTrait>(self, column: C) -> Condition {
        let mut cond = Condition::all();
        if let Some(v) = self.equals {
            cond = cond.add(column.eq(v));
        }
        if let Some(v) = self.not {
            cond = cond.add(column.ne(v));
        }
        if let Some(vs) = self.in_list {
            cond = cond.add(column.is_in(vs));
        }
        if let Some(vs) = self.not_in {
            cond = cond.add(column.is_not_in(vs));
        }
        if let Some(v) = self.contains {
            cond = cond.add(column.like(like_pattern("%", &v, "%")));
        }
        if let Some(v) = self.starts_with {
            cond = cond.add(column.like(like_pattern("", &v, "%")));
        }
        if let Some(v) = self.ends_with {
            cond = cond.add(column.like(like_pattern("%", &v, "")));
        }
        add_null_check(cond, column, self.is_null)
    }
}

const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `value` literally between `prefix` and `suffix`.
fn like_pattern(prefix: &str, value: &str, suffix: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push_str(prefix);
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push_str(suffix);
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

fn add_null_check<C: ColumnTrait>(cond: Condition, column: C, is_null: Option<bool>) -> Condition {
    match is_null {
        Some(true) => cond.add(column.is_null()),
        Some(false) => cond.add(column.is_not_null()),
        None => cond,
    }
}

/// Adds `filter` on `column` to `cond` when present.
pub(crate) fn push_scalar<T, C>(cond: Condition, column: C, filter: Option<ScalarFilter<T>>) -> Condition
where
    T: Into<Value>,
    C: ColumnTrait,
{
    match filter {
        Some(f) => cond.add(f.into_condition(column)),
        None => cond,
    }
}

/// Adds `filter` on `column` to `cond` when present.
pub(crate) fn push_string<C: ColumnTrait>(
    cond: Condition,
    column: C,
    filter: Option<StringFilter>,
) -> Condition {
    match filter {
        Some(f) => cond.add(f.into_condition(column)),
        None => cond,
    }
}

/// Appends the `and` / `or` / `not` combinators of a where input.
pub(crate) fn push_logical<W>(
    mut cond: Condition,
    and: Vec<W>,
    or: Vec<W>,
    not: Vec<W>,
    into_condition: fn(W) -> Condition,
) -> Condition {
    for w in and {
        cond = cond.add(into_condition(w));
    }
    if !or.is_empty() {
        let any = or
            .into_iter()
            .fold(Condition::any(), |acc, w| acc.add(into_condition(w)));
        cond = cond.add(any);
    }
    for w in not {
        cond = cond.add(into_condition(w).not());
    }
    cond
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{Donation, DonationStatus, donation};
    use sea_orm::{DatabaseBackend, EntityTrait, QueryFilter, QueryTrait};

    fn sql_for(cond: Condition) -> String {
        Donation::find()
            .filter(cond)
            .build(DatabaseBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_empty_filter_adds_nothing() {
        let sql = sql_for(ScalarFilter::<f64>::default().into_condition(donation::Column::Amount));
        let where_clause = sql.split(" WHERE ").nth(1).unwrap_or_default();
        assert!(!where_clause.contains("amount"), "unexpected amount check in {sql}");
    }

    #[test]
    fn test_scalar_filter_combines_with_and() {
        let sql = sql_for(ScalarFilter::between(10.0, 50.0).into_condition(donation::Column::Amount));
        assert!(sql.contains(r#""amount" >= 10"#), "{sql}");
        assert!(sql.contains(r#""amount" <= 50"#), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[test]
    fn test_enum_filter_uses_string_value() {
        let sql = sql_for(
            ScalarFilter::one_of(vec![DonationStatus::Pending, DonationStatus::Verified])
                .into_condition(donation::Column::Status),
        );
        assert!(sql.contains("'pending'"), "{sql}");
        assert!(sql.contains("'verified'"), "{sql}");
    }

    #[test]
    fn test_string_filter_like_patterns() {
        let sql = sql_for(StringFilter::contains("zak").into_condition(donation::Column::DonorName));
        assert!(sql.contains("LIKE '%zak%'"), "{sql}");

        let sql = sql_for(StringFilter::starts_with("DN-").into_condition(
            donation::Column::DonationReferenceNumber,
        ));
        assert!(sql.contains("LIKE 'DN-%'"), "{sql}");
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        let sql = sql_for(StringFilter::contains("50%").into_condition(donation::Column::DonorName));
        assert!(sql.contains(r"LIKE '%50\%%' ESCAPE '\'"), "{sql}");

        let sql = sql_for(StringFilter {
            ends_with: Some("a_b".to_string()),
            ..Default::default()
        }
        .into_condition(donation::Column::DonorName));
        assert!(sql.contains(r"LIKE '%a\_b' ESCAPE '\'"), "{sql}");
    }

    #[test]
    fn test_null_check() {
        let sql = sql_for(StringFilter::null(true).into_condition(donation::Column::UserId));
        assert!(sql.contains(r#""user_id" IS NULL"#), "{sql}");
    }

    #[test]
    fn test_deserialize_filter_from_json() {
        let filter: ScalarFilter<f64> =
            serde_json::from_str(r#"{ "gte": 25.0, "in": [25.0, 50.0] }"#).unwrap();
        assert_eq!(filter.gte, Some(25.0));
        assert_eq!(filter.in_list, Some(vec![25.0, 50.0]));
        assert!(filter.equals.is_none());
    }
}
