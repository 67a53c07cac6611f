//! Loaders and exporters for bhavcopy snapshots and position ledgers.

pub mod bhavcopy;
pub mod csv_storage;
pub mod positions;
pub mod source;
mod table;

pub use bhavcopy::parse_bhavcopy;
pub use csv_storage::CsvStorage;
pub use positions::parse_positions;
pub use source::{
    is_trading_day, snapshot_source_from_config, CsvPositionSource, CsvSnapshotSource,
    DatedDirectorySource, FallbackSource,
};
