//! Program data access - query inputs and delegate wiring for `programs`.
//!
//! Besides the scalar columns, a program can be filtered by whether it has
//! any donation or period matching a nested filter.

use crate::{
    core::{
        delegate::{ArgsOf, ModelSpec},
        donation::{DonationSpec, DonationWhereInput},
        program_period::{ProgramPeriodSpec, ProgramPeriodWhereInput},
        validation::{self, double_option},
    },
    entities::{Donation, Program, ProgramPeriod, ProgramStatus, donation, program, program_period},
    errors::Result,
    query::filter::{ScalarFilter, StringFilter, push_logical, push_scalar, push_string},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, QueryTrait,
    prelude::DateTimeUtc,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub struct ProgramSpec;

/// Filter over programs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramWhereInput {
    pub id: Option<StringFilter>,
    pub name: Option<StringFilter>,
    pub description: Option<StringFilter>,
    pub target_amount: Option<ScalarFilter<f64>>,
    pub status: Option<ScalarFilter<ProgramStatus>>,
    pub approved_by_id: Option<StringFilter>,
    pub approved_at: Option<ScalarFilter<DateTimeUtc>>,
    pub rejected_by_id: Option<StringFilter>,
    pub rejected_at: Option<ScalarFilter<DateTimeUtc>>,
    pub created_at: Option<ScalarFilter<DateTimeUtc>>,
    pub updated_at: Option<ScalarFilter<DateTimeUtc>>,
    /// Programs with at least one donation matching this filter
    pub donations_some: Option<Box<DonationWhereInput>>,
    /// Programs with at least one period matching this filter
    pub periods_some: Option<Box<ProgramPeriodWhereInput>>,
    #[serde(rename = "AND")]
    pub and: Vec<Self>,
    #[serde(rename = "OR")]
    pub or: Vec<Self>,
    #[serde(rename = "NOT")]
    pub not: Vec<Self>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgramWhereUnique {
    Id(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramCreateInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub target_amount: f64,
    #[serde(default)]
    pub status: ProgramStatus,
    #[serde(default)]
    pub approved_by_id: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTimeUtc>,
    #[serde(default)]
    pub rejected_by_id: Option<String>,
    #[serde(default)]
    pub rejected_at: Option<DateTimeUtc>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramUpdateInput {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub target_amount: Option<f64>,
    pub status: Option<ProgramStatus>,
    #[serde(deserialize_with = "double_option")]
    pub approved_by_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub approved_at: Option<Option<DateTimeUtc>>,
    #[serde(deserialize_with = "double_option")]
    pub rejected_by_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub rejected_at: Option<Option<DateTimeUtc>>,
    #[serde(deserialize_with = "double_option")]
    pub rejection_reason: Option<Option<String>>,
}

pub type ProgramFindManyArgs = ArgsOf<ProgramSpec>;

impl ModelSpec for ProgramSpec {
    type Entity = Program;
    type Model = program::Model;
    type ActiveModel = program::ActiveModel;
    type Where = ProgramWhereInput;
    type Unique = ProgramWhereUnique;
    type Create = ProgramCreateInput;
    type Update = ProgramUpdateInput;

    const MODEL_NAME: &'static str = "Program";

    fn id_column() -> program::Column {
        program::Column::Id
    }

    fn where_condition(input: ProgramWhereInput) -> Condition {
        let mut cond = Condition::all();
        cond = push_string(cond, program::Column::Id, input.id);
        cond = push_string(cond, program::Column::Name, input.name);
        cond = push_string(cond, program::Column::Description, input.description);
        cond = push_scalar(cond, program::Column::TargetAmount, input.target_amount);
        cond = push_scalar(cond, program::Column::Status, input.status);
        cond = push_string(cond, program::Column::ApprovedById, input.approved_by_id);
        cond = push_scalar(cond, program::Column::ApprovedAt, input.approved_at);
        cond = push_string(cond, program::Column::RejectedById, input.rejected_by_id);
        cond = push_scalar(cond, program::Column::RejectedAt, input.rejected_at);
        cond = push_scalar(cond, program::Column::CreatedAt, input.created_at);
        cond = push_scalar(cond, program::Column::UpdatedAt, input.updated_at);
        if let Some(donations) = input.donations_some {
            let funded = Donation::find()
                .select_only()
                .column(donation::Column::ProgramId)
                .filter(DonationSpec::where_condition(*donations))
                .into_query();
            cond = cond.add(program::Column::Id.in_subquery(funded));
        }
        if let Some(periods) = input.periods_some {
            let scheduled = ProgramPeriod::find()
                .select_only()
                .column(program_period::Column::ProgramId)
                .filter(ProgramPeriodSpec::where_condition(*periods))
                .into_query();
            cond = cond.add(program::Column::Id.in_subquery(scheduled));
        }
        push_logical(cond, input.and, input.or, input.not, Self::where_condition)
    }

    fn unique_condition(input: ProgramWhereUnique) -> Condition {
        match input {
            ProgramWhereUnique::Id(id) => Condition::all().add(program::Column::Id.eq(id)),
        }
    }

    fn from_create(input: ProgramCreateInput, now: DateTimeUtc) -> Result<program::ActiveModel> {
        Ok(program::ActiveModel {
            id: Set(input.id.unwrap_or_else(validation::new_id)),
            name: Set(validation::non_empty("name", input.name)?),
            description: Set(input.description),
            image_url: Set(input.image_url),
            target_amount: Set(validation::non_negative_amount(input.target_amount)?),
            status: Set(input.status),
            approved_by_id: Set(input.approved_by_id),
            approved_at: Set(input.approved_at),
            rejected_by_id: Set(input.rejected_by_id),
            rejected_at: Set(input.rejected_at),
            rejection_reason: Set(input.rejection_reason),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply_update(model: &mut program::ActiveModel, input: ProgramUpdateInput, now: DateTimeUtc) -> Result<()> {
        if let Some(name) = input.name {
            model.name = Set(validation::non_empty("name", name)?);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(url) = input.image_url {
            model.image_url = Set(url);
        }
        if let Some(target) = input.target_amount {
            model.target_amount = Set(validation::non_negative_amount(target)?);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        if let Some(by) = input.approved_by_id {
            model.approved_by_id = Set(by);
        }
        if let Some(at) = input.approved_at {
            model.approved_at = Set(at);
        }
        if let Some(by) = input.rejected_by_id {
            model.rejected_by_id = Set(by);
        }
        if let Some(at) = input.rejected_at {
            model.rejected_at = Set(at);
        }
        if let Some(reason) = input.rejection_reason {
            model.rejection_reason = Set(reason);
        }
        model.updated_at = Set(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::delegate::Delegate;
    use crate::entities::DonationStatus;
    use crate::errors::Error;
    use crate::query::{FindManyArgs, OrderBy, QueryLimits};
    use crate::test_utils::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_program_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let programs = Delegate::<_, ProgramSpec>::new(&db, QueryLimits::default());

        let result = programs
            .create(ProgramCreateInput {
                name: "   ".to_string(),
                target_amount: 100.0,
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = programs
            .create(ProgramCreateInput {
                name: "Clean Water".to_string(),
                target_amount: -5.0,
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount }) if amount == -5.0));

        let result = programs
            .create(ProgramCreateInput {
                name: "Clean Water".to_string(),
                target_amount: f64::NAN,
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_program() -> Result<()> {
        let client = setup_test_client().await?;
        let admin = create_test_admin(&client, "admin@example.org").await?;
        let program = create_test_program(&client, "School Supplies").await?;
        assert_eq!(program.status, ProgramStatus::Draft);

        let approved = client
            .program()
            .update(
                ProgramWhereUnique::Id(program.id.clone()),
                ProgramUpdateInput {
                    status: Some(ProgramStatus::Approved),
                    approved_by_id: Some(Some(admin.id.clone())),
                    approved_at: Some(Some(Utc::now())),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(approved.status, ProgramStatus::Approved);
        assert_eq!(approved.approved_by_id.as_deref(), Some(admin.id.as_str()));

        // deleting the approving admin keeps the program
        client
            .user()
            .delete(crate::core::user::UserWhereUnique::Id(admin.id))
            .await?;
        let kept = client
            .program()
            .find_unique_or_throw(ProgramWhereUnique::Id(program.id))
            .await?;
        assert!(kept.approved_by_id.is_none());
        assert_eq!(kept.status, ProgramStatus::Approved);
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_by_related_donations_and_periods() -> Result<()> {
        let client = setup_test_client().await?;
        let (funded, period) = setup_with_period(&client, "Funded").await?;
        let idle = create_test_program(&client, "Idle").await?;
        create_test_program(&client, "Unscheduled").await?;
        create_test_period(&client, &idle.id, 1).await?;

        let donation = create_test_donation(&client, &funded.id, &period.id, 50.0).await?;
        client
            .donation()
            .update(
                crate::core::donation::DonationWhereUnique::Id(donation.id),
                crate::core::donation::DonationUpdateInput {
                    status: Some(DonationStatus::Verified),
                    ..Default::default()
                },
            )
            .await?;

        let with_verified = client
            .program()
            .find_many(FindManyArgs::filtered(ProgramWhereInput {
                donations_some: Some(Box::new(DonationWhereInput {
                    status: Some(ScalarFilter::equals(DonationStatus::Verified)),
                    ..Default::default()
                })),
                ..Default::default()
            }))
            .await?;
        assert_eq!(with_verified.len(), 1);
        assert_eq!(with_verified[0].id, funded.id);

        let scheduled = client
            .program()
            .find_many(
                FindManyArgs::filtered(ProgramWhereInput {
                    periods_some: Some(Box::default()),
                    ..Default::default()
                })
                .order_by(OrderBy::asc(program::Column::Name)),
            )
            .await?;
        let names: Vec<_> = scheduled.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Funded", "Idle"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_group_programs_by_status() -> Result<()> {
        let client = setup_test_client().await?;
        for (name, target) in [("A", 100.0), ("B", 300.0), ("C", 50.0)] {
            client
                .program()
                .create(ProgramCreateInput {
                    name: name.to_string(),
                    target_amount: target,
                    ..Default::default()
                })
                .await?;
        }
        client
            .program()
            .update_many(
                ProgramWhereInput {
                    name: Some(StringFilter::one_of(["A", "B"])),
                    ..Default::default()
                },
                ProgramUpdateInput {
                    status: Some(ProgramStatus::Approved),
                    ..Default::default()
                },
            )
            .await?;

        let groups = client
            .program()
            .group_by::<ProgramStatus>(
                program::Column::Status,
                ProgramWhereInput::default(),
                Some(program::Column::TargetAmount),
            )
            .await?;
        assert_eq!(groups.len(), 2);
        // keys sort as stored text: "approved" < "draft"
        assert_eq!(groups[0].key, ProgramStatus::Approved);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].sum, Some(400.0));
        assert_eq!(groups[1].key, ProgramStatus::Draft);
        assert_eq!(groups[1].max, Some(50.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_contains_treats_wildcards_literally() -> Result<()> {
        let client = setup_test_client().await?;
        for name in ["50% off", "500 club", "a_b", "axb"] {
            create_test_program(&client, name).await?;
        }

        let names_containing = |needle: &str| ProgramWhereInput {
            name: Some(StringFilter::contains(needle)),
            ..Default::default()
        };
        let percent = client.program().find_many(FindManyArgs::filtered(names_containing("50%"))).await?;
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "50% off");

        let underscore = client.program().find_many(FindManyArgs::filtered(names_containing("a_b"))).await?;
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].name, "a_b");

        let prefixed = client
            .program()
            .count(ProgramWhereInput {
                name: Some(StringFilter::starts_with("50")),
                ..Default::default()
            })
            .await?;
        assert_eq!(prefixed, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_rejects_non_numeric_field() -> Result<()> {
        let client = setup_test_client().await?;
        create_test_program(&client, "Dated").await?;

        let by_date = client
            .program()
            .aggregate(ProgramWhereInput::default(), program::Column::CreatedAt)
            .await;
        assert!(matches!(by_date, Err(Error::Validation { .. })));

        let by_name = client
            .program()
            .aggregate(ProgramWhereInput::default(), program::Column::Name)
            .await;
        assert!(matches!(by_name, Err(Error::Validation { .. })));

        let grouped = client
            .program()
            .group_by::<ProgramStatus>(
                program::Column::Status,
                ProgramWhereInput::default(),
                Some(program::Column::Name),
            )
            .await;
        assert!(matches!(grouped, Err(Error::Validation { .. })));

        let targets = client
            .program()
            .aggregate(ProgramWhereInput::default(), program::Column::TargetAmount)
            .await?;
        assert_eq!(targets.max, Some(1000.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_include_reviewing_admins() -> Result<()> {
        let client = setup_test_client().await?;
        let approver = create_test_admin(&client, "approver@example.org").await?;
        let rejecter = create_test_admin(&client, "rejecter@example.org").await?;
        let approved = create_test_program(&client, "A approved").await?;
        let rejected = create_test_program(&client, "B rejected").await?;
        create_test_program(&client, "C draft").await?;

        client
            .program()
            .update(
                ProgramWhereUnique::Id(approved.id),
                ProgramUpdateInput {
                    status: Some(ProgramStatus::Approved),
                    approved_by_id: Some(Some(approver.id.clone())),
                    ..Default::default()
                },
            )
            .await?;
        client
            .program()
            .update(
                ProgramWhereUnique::Id(rejected.id),
                ProgramUpdateInput {
                    status: Some(ProgramStatus::Rejected),
                    rejected_by_id: Some(Some(rejecter.id.clone())),
                    ..Default::default()
                },
            )
            .await?;

        let by_name = || FindManyArgs::default().order_by(OrderBy::asc(program::Column::Name));
        let with_approver = client
            .program()
            .find_many_include_linked(by_name(), program::ProgramApprover)
            .await?;
        let approvers: Vec<_> = with_approver
            .iter()
            .map(|(_, admin)| admin.as_ref().map(|a| a.email.as_str()))
            .collect();
        assert_eq!(approvers, vec![Some("approver@example.org"), None, None]);

        let with_rejecter = client
            .program()
            .find_many_include_linked(by_name().skip(1).take(1), program::ProgramRejecter)
            .await?;
        assert_eq!(with_rejecter.len(), 1);
        assert_eq!(with_rejecter[0].0.name, "B rejected");
        assert_eq!(
            with_rejecter[0].1.as_ref().map(|a| a.id.as_str()),
            Some(rejecter.id.as_str())
        );
        Ok(())
    }
}
