use crate::contract::ContractRow;
use crate::error::DeskResult;
use crate::position::PositionRow;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Produces the bhavcopy table for a trading date.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load_snapshot(&self, date: NaiveDate) -> DeskResult<Vec<ContractRow>>;
    fn name(&self) -> &str;
}

/// Produces a trader's open position ledger.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn load_positions(&self) -> DeskResult<Vec<PositionRow>>;
    fn name(&self) -> &str;
}
