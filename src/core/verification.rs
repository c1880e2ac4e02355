//! Verification data access - query inputs and delegate wiring for `verifications`.

use crate::{
    core::{
        delegate::{ArgsOf, Delegate, ModelSpec},
        validation,
    },
    entities::{Verification, verification},
    errors::Result,
    query::filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    prelude::DateTimeUtc,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct VerificationSpec;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationWhereInput {
    pub id: Option<StringFilter>,
    pub identifier: Option<StringFilter>,
    pub value: Option<StringFilter>,
    pub expires_at: Option<ScalarFilter<DateTimeUtc>>,
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
pub enum VerificationWhereUnique {
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub identifier: String,
    pub value: String,
    pub expires_at: DateTimeUtc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationUpdateInput {
    pub value: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
}

pub type VerificationFindManyArgs = ArgsOf<VerificationSpec>;

impl ModelSpec for VerificationSpec {
    type Entity = Verification;
    type Model = verification::Model;
    type ActiveModel = verification::ActiveModel;
    type Where = VerificationWhereInput;
    type Unique = VerificationWhereUnique;
    type Create = VerificationCreateInput;
    type Update = VerificationUpdateInput;

    const MODEL_NAME: &'static str = "Verification";

    fn id_column() -> verification::Column {
        verification::Column::Id
    }

    fn where_condition(input: VerificationWhereInput) -> Condition {
        let mut cond = Condition::all();
        cond = push_string(cond, verification::Column::Id, input.id);
        cond = push_string(cond, verification::Column::Identifier, input.identifier);
        cond = push_string(cond, verification::Column::Value, input.value);
        cond = push_scalar(cond, verification::Column::ExpiresAt, input.expires_at);
        cond = push_scalar(cond, verification::Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, verification::Column::UpdatedAt, input.updated_at);
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: VerificationWhereUnique) -> Condition {
        match input {
            VerificationWhereUnique::Id(id) => Condition::all().add(verification::Column::Id.eq(id)),
        }
    }

    fn from_create(input: VerificationCreateInput, now: DateTimeUtc) -> Result<verification::ActiveModel> {
        Ok(verification::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            identifier: Set(validation::non_empty("identifier", input.identifier)?),
            value: Set(input.value),
            expires_at: Set(input.expires_at),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(
        model: &mut verification::ActiveModel,
        input: VerificationUpdateInput,
        now: DateTimeUtc,
    ) -> Result<()> {
        if let Some(value) = input.value {
            model.value = Set(value);
        }
        if let Some(expires_at) = input.expires_at {
            model.expires_at = Set(expires_at);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

impl<C: ConnectionTrait> Delegate<'_, C, VerificationSpec> {
    /// Most recently created verification for `identifier` that is still valid at `now`.
    pub async fn find_latest_valid(
        &self,
        identifier: &str,
        now: DateTimeUtc,
    ) -> Result<Option<verification::Model>> {
        Verification::find()
            .filter(verification::Column::Identifier.eq(identifier))
            .filter(verification::Column::ExpiresAt.gt(now))
            .order_by_desc(verification::Column::CreatedAt)
            .one(self.db)
            .await
            .map_err(Self::db_err)
    }

    /// Removes every verification that expired before `now`.
    pub async fn delete_expired(&self, now: DateTimeUtc) -> Result<u64> {
        let removed = Verification::delete_many()
            .filter(verification::Column::ExpiresAt.lt(now))
            .exec(self.db)
            .await
            .map_err(Self::db_err)?
            .rows_affected;
        info!("Pruned {} expired verifications", removed);
        Ok(removed)
    }
}
