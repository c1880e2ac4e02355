//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod donation;
pub mod donation_proof;
pub mod program;
pub mod program_period;
pub mod session;
pub mod user;
pub mod verification;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use donation::{
    Column as DonationColumn, DonationStatus, Entity as Donation, Model as DonationModel,
};
pub use donation_proof::{
    Column as DonationProofColumn, Entity as DonationProof, Model as DonationProofModel,
};
pub use program::{Column as ProgramColumn, Entity as Program, Model as ProgramModel, ProgramStatus};
pub use program_period::{
    Column as ProgramPeriodColumn, Entity as ProgramPeriod, Model as ProgramPeriodModel,
    RecurringFrequency,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserRole};
pub use verification::{
    Column as VerificationColumn, Entity as Verification, Model as VerificationModel,
};
