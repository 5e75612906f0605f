pub mod error;
pub mod report;
pub mod runner;
pub mod scenario;

pub use error::HeadlessError;
pub use runner::Runner;
pub use scenario::{Scenario, ScheduledCommand};
