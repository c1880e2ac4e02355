//! Program period entity - One time-boxed cycle of a program.
//!
//! Recurring programs describe their cadence with `recurring_frequency`,
//! `recurring_day` and `recurring_duration`. `current_amount` holds the sum of
//! verified donations made during the period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How often a recurring program opens a new period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RecurringFrequency {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// Program period database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Program this period belongs to
    pub program_id: String,
    /// 1-based position of this period within the program
    pub cycle_number: i32,
    pub start_date: DateTimeUtc,
    /// `None` for an open-ended period
    pub end_date: Option<DateTimeUtc>,
    pub recurring_frequency: Option<RecurringFrequency>,
    /// Day within the frequency (weekday, day of month, ...) a new period opens
    pub recurring_day: Option<i32>,
    /// Length of each period in days
    pub recurring_duration: Option<i32>,
    /// Number of cycles after which the program stops recurring
    pub total_cycles: Option<i32>,
    pub next_activation_date: Option<DateTimeUtc>,
    /// Sum of verified donation amounts for this period
    pub current_amount: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between ProgramPeriod and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each period belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk-program_periods-program_id"
    )]
    Program,
    /// One period has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
