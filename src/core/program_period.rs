//! Program period data access - query inputs, delegate wiring and the running
//! total of verified donations kept in `current_amount`.

use crate::{
    core::{
        delegate::{ArgsOf, Delegate, ModelSpec},
        donation::DonationWhereInput,
        validation::{self, double_option},
    },
    entities::{DonationStatus, ProgramPeriod, RecurringFrequency, donation, program_period},
    errors::{Error, Result},
    query::{
        FindManyArgs, OrderBy,
        filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
    },
};
use sea_orm::{
    ActiveValue::{self, Set},
    ColumnTrait, Condition, ConnectionTrait,
    prelude::DateTimeUtc,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct ProgramPeriodSpec;

/// Filter over program periods
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramPeriodWhereInput {
    pub id: Option<StringFilter>,
    pub program_id: Option<StringFilter>,
    pub cycle_number: Option<ScalarFilter<i32>>,
    pub start_date: Option<ScalarFilter<DateTimeUtc>>,
    pub end_date: Option<ScalarFilter<DateTimeUtc>>,
    pub recurring_frequency: Option<ScalarFilter<RecurringFrequency>>,
    pub next_activation_date: Option<ScalarFilter<DateTimeUtc>>,
    pub current_amount: Option<ScalarFilter<f64>>,
    pub created_at: Option<ScalarFilter<DateTimeUtc>>,
    pub updated_at: Option<ScalarFilter<DateTimeUtc>>,
    #[serde(rename = "AND")]
    pub and: Vec<Self>,
    #[serde(rename = "OR")]
    pub or: Vec<Self>,
    #[serde(rename = "NOT")]
    pub not: Vec<Self>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgramPeriodWhereUnique {
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramPeriodCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub program_id: String,
    pub cycle_number: i32,
    pub start_date: DateTimeUtc,
    #[serde(default)]
    pub end_date: Option<DateTimeUtc>,
    #[serde(default)]
    pub recurring_frequency: Option<RecurringFrequency>,
    #[serde(default)]
    pub recurring_day: Option<i32>,
    #[serde(default)]
    pub recurring_duration: Option<i32>,
    #[serde(default)]
    pub total_cycles: Option<i32>,
    #[serde(default)]
    pub next_activation_date: Option<DateTimeUtc>,
    #[serde(default)]
    pub current_amount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramPeriodUpdateInput {
    pub cycle_number: Option<i32>,
    pub start_date: Option<DateTimeUtc>,
    #[serde(deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTimeUtc>>,
    #[serde(deserialize_with = "double_option")]
    pub recurring_frequency: Option<Option<RecurringFrequency>>,
    #[serde(deserialize_with = "double_option")]
    pub recurring_day: Option<Option<i32>>,
    #[serde(deserialize_with = "double_option")]
    pub recurring_duration: Option<Option<i32>>,
    #[serde(deserialize_with = "double_option")]
    pub total_cycles: Option<Option<i32>>,
    #[serde(deserialize_with = "double_option")]
    pub next_activation_date: Option<Option<DateTimeUtc>>,
    pub current_amount: Option<f64>,
}

pub type ProgramPeriodFindManyArgs = ArgsOf<ProgramPeriodSpec>;

fn cycle_number(value: i32) -> Result<i32> {
    if value < 1 {
        return Err(Error::validation(format!(
            "cycle_number must be at least 1, got {value}"
        )));
    }
    Ok(value)
}

fn known<V: Into<sea_orm::Value>>(value: &ActiveValue<V>) -> Option<&V> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

impl ModelSpec for ProgramPeriodSpec {
    type Entity = ProgramPeriod;
    type Model = program_period::Model;
    type ActiveModel = program_period::ActiveModel;
    type Where = ProgramPeriodWhereInput;
    type Unique = ProgramPeriodWhereUnique;
    type Create = ProgramPeriodCreateInput;
    type Update = ProgramPeriodUpdateInput;

    const MODEL_NAME: &'static str = "ProgramPeriod";

    fn id_column() -> program_period::Column {
        program_period::Column::Id
    }

    fn where_condition(input: ProgramPeriodWhereInput) -> Condition {
        use program_period::Column;

        let mut cond = Condition::all();
        cond = push_string(cond, Column::Id, input.id);
        cond = push_string(cond, Column::ProgramId, input.program_id);
        cond = push_scalar(cond, Column::CycleNumber, input.cycle_number);
        cond = push_scalar(cond, Column::StartDate, input.start_date);
        cond = push_scalar(cond, Column::EndDate, input.end_date);
        cond = push_scalar(cond, Column::RecurringFrequency, input.recurring_frequency);
        cond = push_scalar(cond, Column::NextActivationDate, input.next_activation_date);
        cond = push_scalar(cond, Column::CurrentAmount, input.current_amount);
        cond = push_scalar(cond, Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, Column::UpdatedAt, input.updated_at);
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: ProgramPeriodWhereUnique) -> Condition {
        match input {
            ProgramPeriodWhereUnique::Id(id) => Condition::all().add(program_period::Column::Id.eq(id)),
        }
    }

    fn from_create(input: ProgramPeriodCreateInput, now: DateTimeUtc) -> Result<program_period::ActiveModel> {
        validation::date_order(input.start_date, input.end_date)?;
        Ok(program_period::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            program_id: Set(input.program_id),
            cycle_number: Set(cycle_number(input.cycle_number)?),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            recurring_frequency: Set(input.recurring_frequency),
            recurring_day: Set(input.recurring_day),
            recurring_duration: Set(input.recurring_duration),
            total_cycles: Set(input.total_cycles),
            next_activation_date: Set(input.next_activation_date),
            current_amount: Set(validation::non_negative_amount(input.current_amount)?),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(
        model: &mut program_period::ActiveModel,
        input: ProgramPeriodUpdateInput,
        now: DateTimeUtc,
    ) -> Result<()> {
        if let Some(cycle) = input.cycle_number {
            model.cycle_number = Set(cycle_number(cycle)?);
        }
        if let Some(start) = input.start_date {
            model.start_date = Set(start);
        }
        if let Some(end) = input.end_date {
            model.end_date = Set(end);
        }
        // only checked when both dates are known, as update_many starts from a blank model
        if let (Some(start), Some(end)) = (known(&model.start_date), known(&model.end_date)) {
            validation::date_order(*start, *end)?;
        }
        if let Some(frequency) = input.recurring_frequency {
            model.recurring_frequency = Set(frequency);
        }
        if let Some(day) = input.recurring_day {
            model.recurring_day = Set(day);
        }
        if let Some(duration) = input.recurring_duration {
            model.recurring_duration = Set(duration);
        }
        if let Some(total) = input.total_cycles {
            model.total_cycles = Set(total);
        }
        if let Some(next) = input.next_activation_date {
            model.next_activation_date = Set(next);
        }
        if let Some(amount) = input.current_amount {
            model.current_amount = Set(validation::non_negative_amount(amount)?);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

impl<C: ConnectionTrait> Delegate<'_, C, ProgramPeriodSpec> {
    /// Periods of `program_id`, first cycle first.
    pub async fn list_for_program(&self, program_id: &str) -> Result<Vec<program_period::Model>> {
        self.find_many(
            FindManyArgs::filtered(ProgramPeriodWhereInput {
                program_id: Some(StringFilter::equals(program_id)),
                ..Default::default()
            })
            .order_by(OrderBy::asc(program_period::Column::CycleNumber)),
        )
        .await
    }

    /// Sum of the verified donations made towards `period_id`.
    pub async fn sum_verified_amount(&self, period_id: &str) -> Result<f64> {
        let donations = Delegate::<C, crate::core::donation::DonationSpec>::new(self.db, self.limits);
        let totals = donations
            .aggregate(
                DonationWhereInput {
                    program_period_id: Some(StringFilter::equals(period_id)),
                    status: Some(ScalarFilter::equals(DonationStatus::Verified)),
                    ..Default::default()
                },
                donation::Column::Amount,
            )
            .await?;
        Ok(totals.sum.unwrap_or(0.0))
    }

    /// Recomputes `current_amount` of `period_id` from its verified donations.
    pub async fn refresh_current_amount(&self, period_id: &str) -> Result<program_period::Model> {
        let total = self.sum_verified_amount(period_id).await?;
        let period = self
            .update(
                ProgramPeriodWhereUnique::Id(period_id.to_string()),
                ProgramPeriodUpdateInput {
                    current_amount: Some(total),
                    ..Default::default()
                },
            )
            .await?;
        info!("Period {} now holds {:.2} in verified donations", period.id, total);
        Ok(period)
    }
}
