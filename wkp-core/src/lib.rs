pub mod config;
pub mod console;
pub mod poll;
pub mod render;

pub use config::{ConsoleConfig, ConfigError};
pub use console::{ConsoleEvent, ConsoleState, SearchOutcome, SearchPhase};
pub use poll::{StatsPoller, STATS_POLL_INTERVAL};
