//! Donation entity - A pledge or payment made towards a program period.
//!
//! Each donation has a `program_id`, `program_period_id`, optional donor `user_id`,
//! amount, status (pending/verified/rejected), payment details and a unique
//! `donation_reference_number`. Admins record who verified it in `verified_by_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a donation
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Submitted, waiting for an admin to check the proof
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Program the donation is made to
    pub program_id: String,
    /// Period the donation counts towards
    pub program_period_id: String,
    /// Donor account, `None` for anonymous or guest donations
    pub user_id: Option<String>,
    /// Name given by a guest donor
    pub donor_name: Option<String>,
    /// Donated amount, always positive
    pub amount: f64,
    pub status: DonationStatus,
    /// Payment channel, e.g. `"bank_transfer"`
    pub payment_method: String,
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    /// Optional note from the donor
    pub message: Option<String>,
    /// Admin who verified the donation
    pub verified_by_id: Option<String>,
    pub verified_at: Option<DateTimeUtc>,
    /// Reference handed to the donor, unique across all donations
    #[sea_orm(unique)]
    pub donation_reference_number: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Donation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each donation belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk-donations-program_id"
    )]
    Program,
    /// Each donation belongs to one program period
    #[sea_orm(
        belongs_to = "super::program_period::Entity",
        from = "Column::ProgramPeriodId",
        to = "super::program_period::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk-donations-program_period_id"
    )]
    ProgramPeriod,
    /// Optional donor
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull",
        fk_name = "fk-donations-user_id"
    )]
    Donor,
    /// Optional verifying admin
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VerifiedById",
        to = "super::user::Column::Id",
        on_delete = "SetNull",
        fk_name = "fk-donations-verified_by_id"
    )]
    VerifiedBy,
    /// One donation has many proof uploads
    #[sea_orm(has_many = "super::donation_proof::Entity")]
    Proofs,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::program_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgramPeriod.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl Related<super::donation_proof::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proofs.def()
    }
}

/// Donation to the admin who verified it
#[derive(Debug, Clone, Copy)]
pub struct DonationVerifier;

impl Linked for DonationVerifier {
    type FromEntity = Entity;
    type ToEntity = super::user::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::VerifiedBy.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}
