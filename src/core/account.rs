//! Account data access - query inputs and delegate wiring for `accounts`.

use crate::{
    core::{
        delegate::{ArgsOf, Delegate, ModelSpec},
        validation::{self, double_option},
    },
    entities::{Account, account},
    errors::Result,
    query::filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    prelude::DateTimeUtc,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub struct AccountSpec;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountWhereInput {
    pub id: Option<StringFilter>,
    pub user_id: Option<StringFilter>,
    pub account_id: Option<StringFilter>,
    pub provider_id: Option<StringFilter>,
    pub access_token_expires_at: Option<ScalarFilter<DateTimeUtc>>,
    pub refresh_token_expires_at: Option<ScalarFilter<DateTimeUtc>>,
    pub scope: Option<StringFilter>,
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
pub enum AccountWhereUnique {
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub account_id: String,
    pub provider_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token_expires_at: Option<DateTimeUtc>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<DateTimeUtc>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountUpdateInput {
    #[serde(deserialize_with = "double_option")]
    pub access_token: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub refresh_token: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub id_token: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub access_token_expires_at: Option<Option<DateTimeUtc>>,
    #[serde(deserialize_with = "double_option")]
    pub refresh_token_expires_at: Option<Option<DateTimeUtc>>,
    #[serde(deserialize_with = "double_option")]
    pub scope: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub password: Option<Option<String>>,
}

pub type AccountFindManyArgs = ArgsOf<AccountSpec>;

impl ModelSpec for AccountSpec {
    type Entity = Account;
    type Model = account::Model;
    type ActiveModel = account::ActiveModel;
    type Where = AccountWhereInput;
    type Unique = AccountWhereUnique;
    type Create = AccountCreateInput;
    type Update = AccountUpdateInput;

    const MODEL_NAME: &'static str = "Account";

    fn id_column() -> account::Column {
        account::Column::Id
    }

    fn where_condition(input: AccountWhereInput) -> Condition {
        let mut cond = Condition::all();
        cond = push_string(cond, account::Column::Id, input.id);
        cond = push_string(cond, account::Column::UserId, input.user_id);
        cond = push_string(cond, account::Column::AccountId, input.account_id);
        cond = push_string(cond, account::Column::ProviderId, input.provider_id);
        cond = push_scalar(cond, account::Column::AccessTokenExpiresAt, input.access_token_expires_at);
        cond = push_scalar(cond, account::Column::RefreshTokenExpiresAt, input.refresh_token_expires_at);
        cond = push_string(cond, account::Column::Scope, input.scope);
        cond = push_scalar(cond, account::Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, account::Column::UpdatedAt, input.updated_at);
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: AccountWhereUnique) -> Condition {
        match input {
            AccountWhereUnique::Id(id) => Condition::all().add(account::Column::Id.eq(id)),
        }
    }

    fn from_create(input: AccountCreateInput, now: DateTimeUtc) -> Result<account::ActiveModel> {
        Ok(account::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            user_id: Set(input.user_id),
            account_id: Set(validation::non_empty("account_id", input.account_id)?),
            provider_id: Set(validation::non_empty("provider_id", input.provider_id)?),
            access_token: Set(input.access_token),
            refresh_token: Set(input.refresh_token),
            id_token: Set(input.id_token),
            access_token_expires_at: Set(input.access_token_expires_at),
            refresh_token_expires_at: Set(input.refresh_token_expires_at),
            scope: Set(input.scope),
            password: Set(input.password),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(model: &mut account::ActiveModel, input: AccountUpdateInput, now: DateTimeUtc) -> Result<()> {
        if let Some(v) = input.access_token {
            model.access_token = Set(v);
        }
        if let Some(v) = input.refresh_token {
            model.refresh_token = Set(v);
        }
        if let Some(v) = input.id_token {
            model.id_token = Set(v);
        }
        if let Some(v) = input.access_token_expires_at {
            model.access_token_expires_at = Set(v);
        }
        if let Some(v) = input.refresh_token_expires_at {
            model.refresh_token_expires_at = Set(v);
        }
        if let Some(v) = input.scope {
            model.scope = Set(v);
        }
        if let Some(v) = input.password {
            model.password = Set(v);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

impl<C: ConnectionTrait> Delegate<'_, C, AccountSpec> {
    /// Finds the account a user holds at `provider_id`.
    pub async fn find_for_provider(&self, user_id: &str, provider_id: &str) -> Result<Option<account::Model>> {
        Account::find()
            .filter(account::Column::UserId.eq(user_id))
            .filter(account::Column::ProviderId.eq(provider_id))
            .one(self.db)
            .await
            .map_err(Self::db_err)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::user::UserWhereUnique;
    use crate::entities::User;
    use crate::query::FindManyArgs;
    use crate::test_utils::*;

    fn credential(user_id: &str) -> AccountCreateInput {
        AccountCreateInput {
            user_id: user_id.to_string(),
            account_id: user_id.to_string(),
            provider_id: "credential".to_string(),
            password: Some("$argon2id$hash".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_find_for_provider() -> Result<()> {
        let client = setup_test_client().await?;
        let user = create_test_user(&client, "acc@example.org").await?;
        client.account().create(credential(&user.id)).await?;
        client
            .account()
            .create(AccountCreateInput {
                user_id: user.id.clone(),
                account_id: "g-123".to_string(),
                provider_id: "google".to_string(),
                access_token: Some("ya29".to_string()),
                ..Default::default()
            })
            .await?;

        let google = client.account().find_for_provider(&user.id, "google").await?.unwrap();
        assert_eq!(google.account_id, "g-123");
        assert!(google.password.is_none());
        assert!(client.account().find_for_provider(&user.id, "github").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_tokens_with_update_many() -> Result<()> {
        let client = setup_test_client().await?;
        let user = create_test_user(&client, "tokens@example.org").await?;
        for provider in ["google", "github"] {
            client
                .account()
                .create(AccountCreateInput {
                    user_id: user.id.clone(),
                    account_id: format!("{provider}-1"),
                    provider_id: provider.to_string(),
                    access_token: Some("secret".to_string()),
                    ..Default::default()
                })
                .await?;
        }

        let cleared = client
            .account()
            .update_many(
                AccountWhereInput {
                    user_id: Some(StringFilter::equals(user.id.clone())),
                    ..Default::default()
                },
                AccountUpdateInput {
                    access_token: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(cleared, 2);

        let accounts = client.account().find_many(FindManyArgs::default()).await?;
        assert!(accounts.iter().all(|a| a.access_token.is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn test_user_include_accounts() -> Result<()> {
        let client = setup_test_client().await?;
        let with = create_test_user(&client, "with@example.org").await?;
        create_test_user(&client, "without@example.org").await?;
        client.account().create(credential(&with.id)).await?;

        let rows = client
            .user()
            .find_many_include_many(FindManyArgs::default(), Account)
            .await?;
        assert_eq!(rows.len(), 2);
        for (user, accounts) in rows {
            let expected = usize::from(user.id == with.id);
            assert_eq!(accounts.len(), expected, "accounts of {}", user.email);
        }

        let owner = client
            .account()
            .find_many_include_one(FindManyArgs::default(), User)
            .await?;
        assert_eq!(owner.len(), 1);
        assert_eq!(owner[0].1.as_ref().map(|u| u.id.as_str()), Some(with.id.as_str()));

        client.user().delete(UserWhereUnique::Id(with.id)).await?;
        assert_eq!(client.account().count(AccountWhereInput::default()).await?, 0);
        Ok(())
    }
}
