//! Verification entity - Short-lived identifier/value pairs used by auth flows
//! such as email confirmation. Has no relations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// What is being verified, e.g. an email address
    pub identifier: String,
    /// The secret value to compare against
    pub value: String,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// `Verification` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
