//! User entity - Account holders and administrators.
//!
//! Users own login sessions and provider accounts. Donors may be linked to their
//! donations, and users with the `admin` role verify donations and approve or
//! reject programs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role stored on every user row
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular donor account
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    /// Administrator allowed to review programs and donations
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Whether the email address has been confirmed
    pub email_verified: bool,
    /// Avatar URL
    pub image: Option<String>,
    pub role: UserRole,
    /// Whether the user is currently banned
    pub banned: bool,
    pub ban_reason: Option<String>,
    /// When the ban lifts; `None` with `banned` set means permanent
    pub ban_expires: Option<DateTimeUtc>,
    pub phone_number: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many login sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
    /// One user has many provider accounts
    #[sea_orm(has_many = "super::account::Entity")]
    Accounts,
    /// One user (as donor) has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

/// Admin to the donations they verified
#[derive(Debug, Clone, Copy)]
pub struct VerifiedDonations;

impl Linked for VerifiedDonations {
    type FromEntity = Entity;
    type ToEntity = super::donation::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![super::donation::Relation::VerifiedBy.def().rev()]
    }
}

/// Admin to the programs they approved
#[derive(Debug, Clone, Copy)]
pub struct ApprovedPrograms;

impl Linked for ApprovedPrograms {
    type FromEntity = Entity;
    type ToEntity = super::program::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![super::program::Relation::ApprovedBy.def().rev()]
    }
}

/// Admin to the programs they rejected
#[derive(Debug, Clone, Copy)]
pub struct RejectedPrograms;

impl Linked for RejectedPrograms {
    type FromEntity = Entity;
    type ToEntity = super::program::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![super::program::Relation::RejectedBy.def().rev()]
    }
}

impl ActiveModelBehavior for ActiveModel {}
