//! Command implementations.

mod ask;
mod config;
mod fetch;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use fetch::run_fetch;
pub use serve::run_serve;
