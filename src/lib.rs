pub mod balance;
pub mod config;
pub mod error;
pub mod exchange;
pub mod schemas;

pub use error::{ConfigError, ValidationError};
pub use exchange::{calculate_balances, settle_group};
pub use schemas::{Balance, Expense, Group, GroupSummary, Member};
