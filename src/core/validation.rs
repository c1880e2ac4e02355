//! Input checks shared by the model create and update paths.

use crate::errors::{Error, Result};
use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Deserializer};

/// Fresh primary key for a new record.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn non_empty(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trims an email address and checks it has a local part and a domain.
pub(crate) fn email(value: String) -> Result<String> {
    let value = non_empty("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(value),
        _ => Err(Error::validation(format!("'{value}' is not a valid email address"))),
    }
}

/// Donations must be finite and strictly positive.
pub(crate) fn positive_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Targets and running totals must be finite and not negative.
pub(crate) fn non_negative_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

pub(crate) fn date_order(start: DateTimeUtc, end: Option<DateTimeUtc>) -> Result<()> {
    match end {
        Some(end) if end < start => Err(Error::validation(format!(
            "end date {end} is before start date {start}"
        ))),
        _ => Ok(()),
    }
}

/// Deserializes a present field (even `null`) as `Some`, so update inputs can
/// tell "clear this column" (`Some(None)`) from "leave it alone" (`None`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
