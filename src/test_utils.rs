//! Shared test utilities for the donation tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        Client,
        donation::DonationCreateInput,
        program::ProgramCreateInput,
        program_period::ProgramPeriodCreateInput,
        user::UserCreateInput,
        validation,
    },
    entities::{self, UserRole},
    errors::Result,
    query::QueryLimits,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness so it only shows for
/// failing tests. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a client over a fresh in-memory database.
/// This is the standard setup for all integration tests.
pub async fn setup_test_client() -> Result<Client> {
    let db = setup_test_db().await?;
    Ok(Client::new(db, QueryLimits::default()))
}

/// Creates a test user with the given email.
///
/// # Defaults
/// * `name`: local part of the email
/// * `role`: [`UserRole::User`]
pub async fn create_test_user(client: &Client, email: &str) -> Result<entities::user::Model> {
    let name = email.split('@').next().unwrap_or(email).to_string();
    client
        .user()
        .create(UserCreateInput {
            name,
            email: email.to_string(),
            ..Default::default()
        })
        .await
}

/// Creates a test user with the admin role.
pub async fn create_test_admin(client: &Client, email: &str) -> Result<entities::user::Model> {
    client
        .user()
        .create(UserCreateInput {
            name: "Admin".to_string(),
            email: email.to_string(),
            role: UserRole::Admin,
            email_verified: true,
            ..Default::default()
        })
        .await
}

/// Creates a draft test program.
///
/// # Defaults
/// * `target_amount`: 1000.0
pub async fn create_test_program(client: &Client, name: &str) -> Result<entities::program::Model> {
    client
        .program()
        .create(ProgramCreateInput {
            name: name.to_string(),
            target_amount: 1000.0,
            ..Default::default()
        })
        .await
}

/// Creates an open-ended period starting now.
pub async fn create_test_period(
    client: &Client,
    program_id: &str,
    cycle_number: i32,
) -> Result<entities::program_period::Model> {
    client
        .program_period()
        .create(ProgramPeriodCreateInput {
            program_id: program_id.to_string(),
            cycle_number,
            start_date: Utc::now(),
            ..Default::default()
        })
        .await
}

/// Creates a pending bank transfer donation with a random reference number.
pub async fn create_test_donation(
    client: &Client,
    program_id: &str,
    period_id: &str,
    amount: f64,
) -> Result<entities::donation::Model> {
    client
        .donation()
        .create(DonationCreateInput {
            program_id: program_id.to_string(),
            program_period_id: period_id.to_string(),
            amount,
            payment_method: "bank_transfer".to_string(),
            donation_reference_number: format!("TEST-{}", validation::new_id()),
            ..Default::default()
        })
        .await
}

/// Sets up a program with its first period.
/// Returns (program, period) for donation-related tests.
pub async fn setup_with_period(
    client: &Client,
    name: &str,
) -> Result<(entities::program::Model, entities::program_period::Model)> {
    let program = create_test_program(client, name).await?;
    let period = create_test_period(client, &program.id, 1).await?;
    Ok((program, period))
}
