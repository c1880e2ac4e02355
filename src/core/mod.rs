/// Account records linking users to auth providers
pub mod account;
/// Connection owner handing out one delegate per model
pub mod client;
/// Generic CRUD, aggregate and group-by operations
pub mod delegate;
/// Donations made towards program periods
pub mod donation;
/// Uploaded payment proofs of donations
pub mod donation_proof;
/// Fundraising programs
pub mod program;
/// Time-boxed cycles of a program
pub mod program_period;
/// Login sessions
pub mod session;
/// Users and their roles
pub mod user;
/// Shared create/update input checks
pub mod validation;
/// One-time verification values (email codes, reset tokens)
pub mod verification;

pub use client::Client;
pub use delegate::{Delegate, ModelSpec};
