//! Session data access - query inputs and delegate wiring for `sessions`.

use crate::{
    core::{
        delegate::{ArgsOf, Delegate, ModelSpec},
        validation::{self, double_option},
    },
    entities::{Session, session},
    errors::Result,
    query::filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    prelude::DateTimeUtc,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct SessionSpec;

/// Filter over sessions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionWhereInput {
    pub id: Option<StringFilter>,
    pub user_id: Option<StringFilter>,
    pub token: Option<StringFilter>,
    pub expires_at: Option<ScalarFilter<DateTimeUtc>>,
    pub ip_address: Option<StringFilter>,
    pub user_agent: Option<StringFilter>,
    pub impersonated_by: Option<StringFilter>,
    pub created_at: Option<ScalarFilter<DateTimeUtc>>,
    pub updated_at: Option<ScalarFilter<DateTimeUtc>>,
    #[serde(rename = "AND")]
    pub and: Vec<Self>,
    #[serde(rename = "OR")]
    pub or: Vec<Self>,
    #[serde(rename = "NOT")]
    pub not: Vec<Self>,
}

/// Selects one session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionWhereUnique {
    Id(String),
    Token(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTimeUtc,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub impersonated_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionUpdateInput {
    pub token: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    #[serde(deserialize_with = "double_option")]
    pub ip_address: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub user_agent: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub impersonated_by: Option<Option<String>>,
}

pub type SessionFindManyArgs = ArgsOf<SessionSpec>;

impl ModelSpec for SessionSpec {
    type Entity = Session;
    type Model = session::Model;
    type ActiveModel = session::ActiveModel;
    type Where = SessionWhereInput;
    type Unique = SessionWhereUnique;
    type Create = SessionCreateInput;
    type Update = SessionUpdateInput;

    const MODEL_NAME: &'static str = "Session";

    fn id_column() -> session::Column {
        session::Column::Id
    }

    fn where_condition(input: SessionWhereInput) -> Condition {
        let mut cond = Condition::all();
        cond = push_string(cond, session::Column::Id, input.id);
        cond = push_string(cond, session::Column::UserId, input.user_id);
        cond = push_string(cond, session::Column::Token, input.token);
        cond = push_scalar(cond, session::Column::ExpiresAt, input.expires_at);
        cond = push_string(cond, session::Column::IpAddress, input.ip_address);
        cond = push_string(cond, session::Column::UserAgent, input.user_agent);
        cond = push_string(cond, session::Column::ImpersonatedBy, input.impersonated_by);
        cond = push_scalar(cond, session::Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, session::Column::UpdatedAt, input.updated_at);
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: SessionWhereUnique) -> Condition {
        match input {
            SessionWhereUnique::Id(id) => Condition::all().add(session::Column::Id.eq(id)),
            SessionWhereUnique::Token(token) => Condition::all().add(session::Column::Token.eq(token)),
        }
    }

    fn from_create(input: SessionCreateInput, now: DateTimeUtc) -> Result<session::ActiveModel> {
        Ok(session::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            user_id: Set(input.user_id),
            token: Set(validation::non_empty("token", input.token)?),
            expires_at: Set(input.expires_at),
            ip_address: Set(input.ip_address),
            user_agent: Set(input.user_agent),
            impersonated_by: Set(input.impersonated_by),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(model: &mut session::ActiveModel, input: SessionUpdateInput, now: DateTimeUtc) -> Result<()> {
        if let Some(token) = input.token {
            model.token = Set(validation::non_empty("token", token)?);
        }
        if let Some(expires_at) = input.expires_at {
            model.expires_at = Set(expires_at);
        }
        if let Some(ip) = input.ip_address {
            model.ip_address = Set(ip);
        }
        if let Some(agent) = input.user_agent {
            model.user_agent = Set(agent);
        }
        if let Some(by) = input.impersonated_by {
            model.impersonated_by = Set(by);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

impl<C: ConnectionTrait> Delegate<'_, C, SessionSpec> {
    /// Finds a session by its token.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<session::Model>> {
        self.find_unique(SessionWhereUnique::Token(token.to_string())).await
    }

    /// Removes every session that expired before `now`.
    pub async fn delete_expired(&self, now: DateTimeUtc) -> Result<u64> {
        let removed = Session::delete_many()
            .filter(session::Column::ExpiresAt.lt(now))
            .exec(self.db)
            .await
            .map_err(Self::db_err)?
            .rows_affected;
        info!("Pruned {} expired sessions", removed);
        Ok(removed)
    }
}
