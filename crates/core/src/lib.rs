pub mod config;
pub mod config_loader;
pub mod contract;
pub mod error;
pub mod position;
pub mod traits;

pub use config::{
    AppConfig, AtmPositionConfig, ReconciliationConfig, SortOrder, SourceConfig,
    TokenSelectorConfig,
};
pub use config_loader::ConfigLoader;
pub use contract::{ContractRow, ExpiryMonth, Instrument, OptionKind};
pub use error::{DeskError, DeskResult};
pub use position::{InstrumentClass, PositionRow};
pub use traits::{PositionSource, SnapshotSource};
