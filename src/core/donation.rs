//! Donation data access - query inputs and delegate wiring for `donations`.
//!
//! A donation is tied to one program and one of its periods through foreign
//! keys; the donor and the verifying admin are optional users.

use crate::{
    core::{
        delegate::{ArgsOf, Delegate, ModelSpec},
        donation_proof::{DonationProofSpec, DonationProofWhereInput},
        program::{ProgramSpec, ProgramWhereInput},
        validation::{self, double_option},
    },
    entities::{Donation, DonationStatus, Program, donation, donation_proof, program},
    errors::Result,
    query::{
        FindManyArgs, OrderBy,
        filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
    },
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
    QueryTrait, prelude::DateTimeUtc,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub struct DonationSpec;

/// Filter over donations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationWhereInput {
    pub id: Option<StringFilter>,
    pub program_id: Option<StringFilter>,
    pub program_period_id: Option<StringFilter>,
    pub user_id: Option<StringFilter>,
    pub donor_name: Option<StringFilter>,
    pub amount: Option<ScalarFilter<f64>>,
    pub status: Option<ScalarFilter<DonationStatus>>,
    pub payment_method: Option<StringFilter>,
    pub bank_account_name: Option<StringFilter>,
    pub bank_account_number: Option<StringFilter>,
    pub message: Option<StringFilter>,
    pub verified_by_id: Option<StringFilter>,
    pub verified_at: Option<ScalarFilter<DateTimeUtc>>,
    pub donation_reference_number: Option<StringFilter>,
    pub created_at: Option<ScalarFilter<DateTimeUtc>>,
    pub updated_at: Option<ScalarFilter<DateTimeUtc>>,
    /// Donations whose program matches this filter
    pub program: Option<Box<ProgramWhereInput>>,
    #[serde(rename = "AND")]
    pub and: Vec<Self>,
    #[serde(rename = "OR")]
    pub or: Vec<Self>,
    #[serde(rename = "NOT")]
    pub not: Vec<Self>,
}

/// Selects one donation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationWhereUnique {
    Id(String),
    DonationReferenceNumber(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub program_id: String,
    pub program_period_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub donor_name: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub status: DonationStatus,
    pub payment_method: String,
    #[serde(default)]
    pub bank_account_name: Option<String>,
    #[serde(default)]
    pub bank_account_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub verified_by_id: Option<String>,
    #[serde(default)]
    pub verified_at: Option<DateTimeUtc>,
    pub donation_reference_number: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationUpdateInput {
    #[serde(deserialize_with = "double_option")]
    pub user_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub donor_name: Option<Option<String>>,
    pub amount: Option<f64>,
    pub status: Option<DonationStatus>,
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub bank_account_name: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub bank_account_number: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub message: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub verified_by_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub verified_at: Option<Option<DateTimeUtc>>,
}

pub type DonationFindManyArgs = ArgsOf<DonationSpec>;

impl ModelSpec for DonationSpec {
    type Entity = Donation;
    type Model = donation::Model;
    type ActiveModel = donation::ActiveModel;
    type Where = DonationWhereInput;
    type Unique = DonationWhereUnique;
    type Create = DonationCreateInput;
    type Update = DonationUpdateInput;

    const MODEL_NAME: &'static str = "Donation";

    fn id_column() -> donation::Column {
        donation::Column::Id
    }

    fn where_condition(input: DonationWhereInput) -> Condition {
        use donation::Column;

        let mut cond = Condition::all();
        cond = push_string(cond, Column::Id, input.id);
        cond = push_string(cond, Column::ProgramId, input.program_id);
        cond = push_string(cond, Column::ProgramPeriodId, input.program_period_id);
        cond = push_string(cond, Column::UserId, input.user_id);
        cond = push_string(cond, Column::DonorName, input.donor_name);
        cond = push_scalar(cond, Column::Amount, input.amount);
        cond = push_scalar(cond, Column::Status, input.status);
        cond = push_string(cond, Column::PaymentMethod, input.payment_method);
        cond = push_string(cond, Column::BankAccountName, input.bank_account_name);
        cond = push_string(cond, Column::BankAccountNumber, input.bank_account_number);
        cond = push_string(cond, Column::Message, input.message);
        cond = push_string(cond, Column::VerifiedById, input.verified_by_id);
        cond = push_scalar(cond, Column::VerifiedAt, input.verified_at);
        cond = push_string(cond, Column::DonationReferenceNumber, input.donation_reference_number);
        cond = push_scalar(cond, Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, Column::UpdatedAt, input.updated_at);
        if let Some(programs) = input.program {
            let matching = Program::find()
                .select_only()
                .column(program::Column::Id)
                .filter(ProgramSpec::where_condition(*programs))
                .into_query();
            cond = cond.add(Column::ProgramId.in_subquery(matching));
        }
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: DonationWhereUnique) -> Condition {
        match input {
            DonationWhereUnique::Id(id) => Condition::all().add(donation::Column::Id.eq(id)),
            DonationWhereUnique::DonationReferenceNumber(reference) => {
                Condition::all().add(donation::Column::DonationReferenceNumber.eq(reference))
            }
        }
    }

    fn from_create(input: DonationCreateInput, now: DateTimeUtc) -> Result<donation::ActiveModel> {
        Ok(donation::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            program_id: Set(input.program_id),
            program_period_id: Set(input.program_period_id),
            user_id: Set(input.user_id),
            donor_name: Set(input.donor_name),
            amount: Set(validation::positive_amount(input.amount)?),
            status: Set(input.status),
            payment_method: Set(validation::non_empty("payment_method", input.payment_method)?),
            bank_account_name: Set(input.bank_account_name),
            bank_account_number: Set(input.bank_account_number),
            message: Set(input.message),
            verified_by_id: Set(input.verified_by_id),
            verified_at: Set(input.verified_at),
            donation_reference_number: Set(validation::non_empty(
                "donation_reference_number",
                input.donation_reference_number,
            )?),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(model: &mut donation::ActiveModel, input: DonationUpdateInput, now: DateTimeUtc) -> Result<()> {
        if let Some(user_id) = input.user_id {
            model.user_id = Set(user_id);
        }
        if let Some(name) = input.donor_name {
            model.donor_name = Set(name);
        }
        if let Some(amount) = input.amount {
            model.amount = Set(validation::positive_amount(amount)?);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        if let Some(method) = input.payment_method {
            model.payment_method = Set(validation::non_empty("payment_method", method)?);
        }
        if let Some(name) = input.bank_account_name {
            model.bank_account_name = Set(name);
        }
        if let Some(number) = input.bank_account_number {
            model.bank_account_number = Set(number);
        }
        if let Some(message) = input.message {
            model.message = Set(message);
        }
        if let Some(by) = input.verified_by_id {
            model.verified_by_id = Set(by);
        }
        if let Some(at) = input.verified_at {
            model.verified_at = Set(at);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

impl<C: ConnectionTrait> Delegate<'_, C, DonationSpec> {
    /// Finds a donation by the reference number handed to the donor.
    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<donation::Model>> {
        self.find_unique(DonationWhereUnique::DonationReferenceNumber(
            reference.trim().to_string(),
        ))
        .await
    }

    /// Proofs uploaded for `donation_id`, oldest first.
    pub async fn proofs(&self, donation_id: &str) -> Result<Vec<donation_proof::Model>> {
        Delegate::<C, DonationProofSpec>::new(self.db, self.limits)
            .find_many(
                FindManyArgs::filtered(DonationProofWhereInput {
                    donation_id: Some(StringFilter::equals(donation_id)),
                    ..Default::default()
                })
                .order_by(OrderBy::asc(donation_proof::Column::UploadedAt)),
            )
            .await
    }
}
