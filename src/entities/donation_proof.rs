//! Donation proof entity - An uploaded image showing a donation was paid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donation proof database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donation_proofs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Donation this proof belongs to
    pub donation_id: String,
    /// Storage path of the uploaded image
    pub image_path: String,
    /// Original file name
    pub image_name: String,
    /// Size in bytes
    pub file_size: i64,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donation::Entity",
        from = "Column::DonationId",
        to = "super::donation::Column::Id",
        on_delete = "Cascade",
        fk_name = "fk-donation_proofs-donation_id"
    )]
    Donation,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
