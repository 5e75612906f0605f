pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod types;

pub use config::{LumarConfig, SeetheConfig, StepRange};
pub use error::ConfigError;
pub use types::{
    CellKey, EntityId, KnownLocationSet, LunagreeLocation, ObserverId, SeetheState,
};
