//! CLI commands for the F&O desk.

pub mod atm_positions;
pub mod reconcile;
pub mod tokens;

pub use atm_positions::{run_atm_positions, AtmPositionsArgs};
pub use reconcile::{run_reconcile, ReconcileArgs};
pub use tokens::{run_tokens, TokensArgs};
