//! Query argument shapes shared by every model delegate: column filters,
//! ordering and pagination arguments, and aggregate result rows.

pub mod aggregate;
pub mod args;
pub mod filter;

pub use aggregate::{AggregateResult, GroupByRow};
pub use args::{FindManyArgs, OrderBy, QueryLimits, SortOrder};
pub use filter::{ScalarFilter, StringFilter};
