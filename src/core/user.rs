//! User data access - query inputs and delegate wiring for `users`.

use crate::{
    core::{
        delegate::{ArgsOf, Delegate, ModelSpec},
        session::{SessionSpec, SessionWhereInput},
        validation::{self, double_option},
    },
    entities::{Session, User, UserRole, session, user},
    errors::Result,
    query::filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
    QueryTrait, prelude::DateTimeUtc,
};
use serde::Deserialize;

/// Describes `users` to the generic delegate.
#[derive(Debug, Clone, Copy)]
pub struct UserSpec;

/// Filter over users
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserWhereInput {
    pub id: Option<StringFilter>,
    pub name: Option<StringFilter>,
    pub email: Option<StringFilter>,
    pub email_verified: Option<ScalarFilter<bool>>,
    pub role: Option<ScalarFilter<UserRole>>,
    pub banned: Option<ScalarFilter<bool>>,
    pub ban_expires: Option<ScalarFilter<DateTimeUtc>>,
    pub phone_number: Option<StringFilter>,
    pub created_at: Option<ScalarFilter<DateTimeUtc>>,
    pub updated_at: Option<ScalarFilter<DateTimeUtc>>,
    /// Users with at least one session matching this filter
    pub sessions_some: Option<Box<SessionWhereInput>>,
    #[serde(rename = "AND")]
    pub and: Vec<Self>,
    #[serde(rename = "OR")]
    pub or: Vec<Self>,
    #[serde(rename = "NOT")]
    pub not: Vec<Self>,
}

/// Selects one user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserWhereUnique {
    Id(String),
    Email(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub ban_reason: Option<String>,
    #[serde(default)]
    pub ban_expires: Option<DateTimeUtc>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    #[serde(deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub banned: Option<bool>,
    #[serde(deserialize_with = "double_option")]
    pub ban_reason: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub ban_expires: Option<Option<DateTimeUtc>>,
    #[serde(deserialize_with = "double_option")]
    pub phone_number: Option<Option<String>>,
}

pub type UserFindManyArgs = ArgsOf<UserSpec>;

impl ModelSpec for UserSpec {
    type Entity = User;
    type Model = user::Model;
    type ActiveModel = user::ActiveModel;
    type Where = UserWhereInput;
    type Unique = UserWhereUnique;
    type Create = UserCreateInput;
    type Update = UserUpdateInput;

    const MODEL_NAME: &'static str = "User";

    fn id_column() -> user::Column {
        user::Column::Id
    }

    fn where_condition(input: UserWhereInput) -> Condition {
        let mut cond = Condition::all();
        cond = push_string(cond, user::Column::Id, input.id);
        cond = push_string(cond, user::Column::Name, input.name);
        cond = push_string(cond, user::Column::Email, input.email);
        cond = push_scalar(cond, user::Column::EmailVerified, input.email_verified);
        cond = push_scalar(cond, user::Column::Role, input.role);
        cond = push_scalar(cond, user::Column::Banned, input.banned);
        cond = push_scalar(cond, user::Column::BanExpires, input.ban_expires);
        cond = push_string(cond, user::Column::PhoneNumber, input.phone_number);
        cond = push_scalar(cond, user::Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, user::Column::UpdatedAt, input.updated_at);
        if let Some(sessions) = input.sessions_some {
            let owners = Session::find()
                .select_only()
                .column(session::Column::UserId)
                .filter(SessionSpec::where_condition(*sessions))
                .into_query();
            cond = cond.add(user::Column::Id.in_subquery(owners));
        }
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: UserWhereUnique) -> Condition {
        match input {
            UserWhereUnique::Id(id) => Condition::all().add(user::Column::Id.eq(id)),
            UserWhereUnique::Email(email) => Condition::all().add(user::Column::Email.eq(email)),
        }
    }

    fn from_create(input: UserCreateInput, now: DateTimeUtc) -> Result<user::ActiveModel> {
        Ok(user::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            name: Set(validation::non_empty("name", input.name)?),
            email: Set(validation::email(input.email)?),
            email_verified: Set(input.email_verified),
            image: Set(input.image),
            role: Set(input.role),
            banned: Set(input.banned),
            ban_reason: Set(input.ban_reason),
            ban_expires: Set(input.ban_expires),
            phone_number: Set(input.phone_number),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(model: &mut user::ActiveModel, input: UserUpdateInput, now: DateTimeUtc) -> Result<()> {
        if let Some(name) = input.name {
            model.name = Set(validation::non_empty("name", name)?);
        }
        if let Some(email) = input.email {
            model.email = Set(validation::email(email)?);
        }
        if let Some(verified) = input.email_verified {
            model.email_verified = Set(verified);
        }
        if let Some(image) = input.image {
            model.image = Set(image);
        }
        if let Some(role) = input.role {
            model.role = Set(role);
        }
        if let Some(banned) = input.banned {
            model.banned = Set(banned);
        }
        if let Some(reason) = input.ban_reason {
            model.ban_reason = Set(reason);
        }
        if let Some(expires) = input.ban_expires {
            model.ban_expires = Set(expires);
        }
        if let Some(phone) = input.phone_number {
            model.phone_number = Set(phone);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

impl<C: ConnectionTrait> Delegate<'_, C, UserSpec> {
    /// Finds a user by login email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        self.find_unique(UserWhereUnique::Email(email.trim().to_string()))
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::session::SessionCreateInput;
    use crate::errors::Error;
    use crate::query::{FindManyArgs, OrderBy};
    use crate::test_utils::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_create_and_find_user() -> Result<()> {
        let client = setup_test_client().await?;

        let created = create_test_user(&client, "amina@example.org").await?;
        assert_eq!(created.role, UserRole::User);
        assert!(!created.banned);
        assert_eq!(created.created_at, created.updated_at);

        let by_email = client.user().find_by_email(" amina@example.org ").await?;
        assert_eq!(by_email.map(|u| u.id), Some(created.id.clone()));

        let by_id = client
            .user()
            .find_unique_or_throw(UserWhereUnique::Id(created.id.clone()))
            .await?;
        assert_eq!(by_id.email, "amina@example.org");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() -> Result<()> {
        let client = setup_test_client().await?;
        create_test_user(&client, "dup@example.org").await?;

        let result = create_test_user(&client, "dup@example.org").await;
        assert!(matches!(
            result,
            Err(Error::UniqueConstraint { model: "User", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_validation() -> Result<()> {
        let client = setup_test_client().await?;
        let result = client
            .user()
            .create(UserCreateInput {
                name: "Nadia".to_string(),
                email: "not-an-email".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(client.user().count(UserWhereInput::default()).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_clears_nullable_fields() -> Result<()> {
        let client = setup_test_client().await?;
        let user = client
            .user()
            .create(UserCreateInput {
                name: "Budi".to_string(),
                email: "budi@example.org".to_string(),
                phone_number: Some("+62 811 000".to_string()),
                ..Default::default()
            })
            .await?;

        let updated = client
            .user()
            .update(
                UserWhereUnique::Id(user.id.clone()),
                UserUpdateInput {
                    role: Some(UserRole::Admin),
                    phone_number: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(updated.role, UserRole::Admin);
        assert!(updated.phone_number.is_none());
        assert!(updated.updated_at >= user.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_by_role_and_related_sessions() -> Result<()> {
        let client = setup_test_client().await?;
        let admin = create_test_admin(&client, "admin@example.org").await?;
        let donor = create_test_user(&client, "donor@example.org").await?;
        create_test_user(&client, "idle@example.org").await?;

        client
            .session()
            .create(SessionCreateInput {
                user_id: donor.id.clone(),
                token: "tok-donor".to_string(),
                expires_at: Utc::now() + Duration::days(7),
                ..Default::default()
            })
            .await?;

        let admins = client
            .user()
            .find_many(FindManyArgs::filtered(UserWhereInput {
                role: Some(ScalarFilter::equals(UserRole::Admin)),
                ..Default::default()
            }))
            .await?;
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, admin.id);

        let with_sessions = client
            .user()
            .find_many(FindManyArgs::filtered(UserWhereInput {
                sessions_some: Some(Box::default()),
                ..Default::default()
            }))
            .await?;
        assert_eq!(with_sessions.len(), 1);
        assert_eq!(with_sessions[0].id, donor.id);

        let not_admin = client
            .user()
            .find_many(
                FindManyArgs::filtered(UserWhereInput {
                    not: vec![UserWhereInput {
                        role: Some(ScalarFilter::equals(UserRole::Admin)),
                        ..Default::default()
                    }],
                    ..Default::default()
                })
                .order_by(OrderBy::asc(user::Column::Email)),
            )
            .await?;
        let emails: Vec<_> = not_admin.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["donor@example.org", "idle@example.org"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_sessions() -> Result<()> {
        let client = setup_test_client().await?;
        let user = create_test_user(&client, "gone@example.org").await?;
        client
            .session()
            .create(SessionCreateInput {
                user_id: user.id.clone(),
                token: "tok-gone".to_string(),
                expires_at: Utc::now() + Duration::days(1),
                ..Default::default()
            })
            .await?;

        let deleted = client.user().delete(UserWhereUnique::Id(user.id.clone())).await?;
        assert_eq!(deleted.id, user.id);
        assert_eq!(client.session().count(Default::default()).await?, 0);

        let again = client.user().delete(UserWhereUnique::Id(user.id)).await;
        assert!(matches!(again, Err(Error::NotFound { model: "User" })));
        Ok(())
    }

    #[tokio::test]
    async fn test_or_filter_and_delete_many() -> Result<()> {
        let client = setup_test_client().await?;
        create_test_user(&client, "kept@example.org").await?;
        client
            .user()
            .create(UserCreateInput {
                name: "Banned".to_string(),
                email: "banned@example.org".to_string(),
                banned: true,
                ..Default::default()
            })
            .await?;
        create_test_user(&client, "outside@other.net").await?;

        let either = || UserWhereInput {
            or: vec![
                UserWhereInput {
                    email: Some(StringFilter {
                        ends_with: Some("@other.net".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                UserWhereInput {
                    banned: Some(ScalarFilter::equals(true)),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let matched = client
            .user()
            .find_many(FindManyArgs::filtered(either()).order_by(OrderBy::asc(user::Column::Email)))
            .await?;
        let emails: Vec<_> = matched.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["banned@example.org", "outside@other.net"]);

        let last = client
            .user()
            .find_first_or_throw(FindManyArgs::filtered(either()).order_by(OrderBy::desc(user::Column::Email)))
            .await?;
        assert_eq!(last.email, "outside@other.net");

        assert_eq!(client.user().delete_many(either()).await?, 2);
        assert_eq!(client.user().count(Default::default()).await?, 1);

        let gone = client
            .user()
            .find_first_or_throw(FindManyArgs::filtered(either()))
            .await;
        assert!(matches!(gone, Err(Error::NotFound { model: "User" })));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_linked_records() -> Result<()> {
        let client = setup_test_client().await?;
        let admin = create_test_admin(&client, "reviewer@example.org").await?;
        let approved = create_test_program(&client, "Approved").await?;
        create_test_program(&client, "Untouched").await?;
        client
            .program()
            .update(
                crate::core::program::ProgramWhereUnique::Id(approved.id.clone()),
                crate::core::program::ProgramUpdateInput {
                    approved_by_id: Some(Some(admin.id.clone())),
                    ..Default::default()
                },
            )
            .await?;

        let admins = client
            .user()
            .find_many_include_linked_many(
                FindManyArgs::filtered(UserWhereInput {
                    role: Some(ScalarFilter::equals(UserRole::Admin)),
                    ..Default::default()
                }),
                user::ApprovedPrograms,
            )
            .await?;
        assert_eq!(admins.len(), 1);
        let (found, programs) = &admins[0];
        assert_eq!(found.id, admin.id);
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].id, approved.id);

        let rejected = client
            .user()
            .find_many_include_linked_many(FindManyArgs::default(), user::RejectedPrograms)
            .await?;
        assert!(rejected.iter().all(|(_, programs)| programs.is_empty()));
        Ok(())
    }

    #[test]
    fn test_where_input_from_json() {
        let input: UserWhereInput = serde_json::from_str(
            r#"{ "email": { "endsWith": "@example.org" }, "OR": [{ "banned": { "equals": true } }] }"#,
        )
        .unwrap();
        assert_eq!(
            input.email.unwrap().ends_with.as_deref(),
            Some("@example.org")
        );
        assert_eq!(input.or.len(), 1);
        assert_eq!(input.or[0].banned.as_ref().unwrap().equals, Some(true));
    }

    #[test]
    fn test_update_input_distinguishes_null_from_missing() {
        let input: UserUpdateInput =
            serde_json::from_str(r#"{ "image": null, "name": "Sari" }"#).unwrap();
        assert_eq!(input.image, Some(None));
        assert_eq!(input.phone_number, None);
        assert_eq!(input.name.as_deref(), Some("Sari"));
    }
}
