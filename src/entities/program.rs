//! Program entity - A fundraising campaign.
//!
//! Programs start as drafts and are approved or rejected by an admin user.
//! Each program is split into periods and collects donations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a program
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Program database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "programs")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Campaign title shown to donors
    pub name: String,
    pub description: Option<String>,
    /// Banner image URL
    pub image_url: Option<String>,
    /// Amount the campaign aims to raise
    pub target_amount: f64,
    pub status: ProgramStatus,
    /// Admin who approved the program
    pub approved_by_id: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
    /// Admin who rejected the program
    pub rejected_by_id: Option<String>,
    pub rejected_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Program and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One program has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
    /// One program has many periods
    #[sea_orm(has_many = "super::program_period::Entity")]
    Periods,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApprovedById",
        to = "super::user::Column::Id",
        on_delete = "SetNull",
        fk_name = "fk-programs-approved_by_id"
    )]
    ApprovedBy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RejectedById",
        to = "super::user::Column::Id",
        on_delete = "SetNull",
        fk_name = "fk-programs-rejected_by_id"
    )]
    RejectedBy,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::program_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

/// Program to the admin who approved it
#[derive(Debug, Clone, Copy)]
pub struct ProgramApprover;

impl Linked for ProgramApprover {
    type FromEntity = Entity;
    type ToEntity = super::user::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::ApprovedBy.def()]
    }
}

/// Program to the admin who rejected it
#[derive(Debug, Clone, Copy)]
pub struct ProgramRejecter;

impl Linked for ProgramRejecter {
    type FromEntity = Entity;
    type ToEntity = super::user::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::RejectedBy.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}
