//! Entry point of the data layer.
//!
//! A [`Client`] owns the connection pool and hands out one [`Delegate`] per
//! model. Delegates borrow the pool, so they are cheap to create per call.

use crate::{
    config::{Settings, database},
    core::{
        account::AccountSpec,
        delegate::{Delegate, ModelSpec},
        donation::DonationSpec,
        donation_proof::DonationProofSpec,
        program::ProgramSpec,
        program_period::ProgramPeriodSpec,
        session::SessionSpec,
        user::UserSpec,
        verification::VerificationSpec,
    },
    errors::Result,
    query::QueryLimits,
};
use sea_orm::DatabaseConnection;
use tracing::info;

/// Delegate over the client's pooled connection
pub type ClientDelegate<'a, S> = Delegate<'a, DatabaseConnection, S>;

#[derive(Debug)]
pub struct Client {
    db: DatabaseConnection,
    limits: QueryLimits,
}

impl Client {
    #[must_use]
    pub const fn new(db: DatabaseConnection, limits: QueryLimits) -> Self {
        Self { db, limits }
    }

    /// Connects using `settings` without touching the schema.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let db = database::create_connection(&settings.database).await?;
        info!("Connected to database");
        Ok(Self::new(db, settings.query))
    }

    /// Creates any missing tables.
    pub async fn create_tables(&self) -> Result<()> {
        database::create_tables(&self.db).await
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    #[must_use]
    pub const fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Delegate for model `S` over this client's pool.
    #[must_use]
    pub const fn delegate<S: ModelSpec>(&self) -> ClientDelegate<'_, S> {
        Delegate::new(&self.db, self.limits)
    }

    #[must_use]
    pub const fn user(&self) -> ClientDelegate<'_, UserSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn session(&self) -> ClientDelegate<'_, SessionSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn account(&self) -> ClientDelegate<'_, AccountSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn verification(&self) -> ClientDelegate<'_, VerificationSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn program(&self) -> ClientDelegate<'_, ProgramSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn program_period(&self) -> ClientDelegate<'_, ProgramPeriodSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn donation(&self) -> ClientDelegate<'_, DonationSpec> {
        self.delegate()
    }

    #[must_use]
    pub const fn donation_proof(&self) -> ClientDelegate<'_, DonationProofSpec> {
        self.delegate()
    }
}
