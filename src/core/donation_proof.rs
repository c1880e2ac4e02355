//! Donation proof data access - query inputs and delegate wiring for `donation_proofs`.

use crate::{
    core::{
        delegate::{ArgsOf, ModelSpec},
        validation,
    },
    entities::{DonationProof, donation_proof},
    errors::{Error, Result},
    query::filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
};
use sea_orm::{ActiveValue::Set, ColumnTrait, Condition, prelude::DateTimeUtc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub struct DonationProofSpec;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationProofWhereInput {
    pub id: Option<StringFilter>,
    pub donation_id: Option<StringFilter>,
    pub image_path: Option<StringFilter>,
    pub image_name: Option<StringFilter>,
    pub file_size: Option<ScalarFilter<i64>>,
    pub uploaded_at: Option<ScalarFilter<DateTimeUtc>>,
    #[serde(rename = "AND")]
    pub and: Vec<Self>,
    #[serde(rename = "OR")]
    pub or: Vec<Self>,
    #[serde(rename = "NOT")]
    pub not: Vec<Self>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationProofWhereUnique {
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationProofCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub donation_id: String,
    pub image_path: String,
    pub image_name: String,
    pub file_size: i64,
    /// Defaults to the time of insertion
    #[serde(default)]
    pub uploaded_at: Option<DateTimeUtc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationProofUpdateInput {
    pub image_path: Option<String>,
    pub image_name: Option<String>,
    pub file_size: Option<i64>,
}

pub type DonationProofFindManyArgs = ArgsOf<DonationProofSpec>;

fn file_size(size: i64) -> Result<i64> {
    if size < 0 {
        return Err(Error::validation(format!("file_size cannot be negative, got {size}")));
    }
    Ok(size)
}

impl ModelSpec for DonationProofSpec {
    type Entity = DonationProof;
    type Model = donation_proof::Model;
    type ActiveModel = donation_proof::ActiveModel;
    type Where = DonationProofWhereInput;
    type Unique = DonationProofWhereUnique;
    type Create = DonationProofCreateInput;
    type Update = DonationProofUpdateInput;

    const MODEL_NAME: &'static str = "DonationProof";

    fn id_column() -> donation_proof::Column {
        donation_proof::Column::Id
    }

    fn where_condition(input: DonationProofWhereInput) -> Condition {
        let mut cond = Condition::all();
        cond = push_string(cond, donation_proof::Column::Id, input.id);
        cond = push_string(cond, donation_proof::Column::DonationId, input.donation_id);
        cond = push_string(cond, donation_proof::Column::ImagePath, input.image_path);
        cond = push_string(cond, donation_proof::Column::ImageName, input.image_name);
        cond = push_scalar(cond, donation_proof::Column::FileSize, input.file_size);
        cond = push_scalar(cond, donation_proof::Column::UploadedAt, input.uploaded_at);
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: DonationProofWhereUnique) -> Condition {
        match input {
            DonationProofWhereUnique::Id(id) => Condition::all().add(donation_proof::Column::Id.eq(id)),
        }
    }

    fn from_create(input: DonationProofCreateInput, now: DateTimeUtc) -> Result<donation_proof::ActiveModel> {
        Ok(donation_proof::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            donation_id: Set(input.donation_id),
            image_path: Set(validation::non_empty("image_path", input.image_path)?),
            image_name: Set(validation::non_empty("image_name", input.image_name)?),
            file_size: Set(file_size(input.file_size)?),
            uploaded_at: Set(input.uploaded_at.unwrap_or(now)),
        })
    }

    // proofs carry no updated_at column
    fn apply_update(
        model: &mut donation_proof::ActiveModel,
        input: DonationProofUpdateInput,
        _now: DateTimeUtc,
    ) -> Result<()> {
        if let Some(path) = input.image_path {
            model.image_path = Set(validation::non_empty("image_path", path)?);
        }
        if let Some(name) = input.image_name {
            model.image_name = Set(validation::non_empty("image_name", name)?);
        }
        if let Some(size) = input.file_size {
            model.file_size = Set(file_size(size)?);
        }
        Ok(())
    }
}
