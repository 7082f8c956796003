//! CLI command implementations

pub mod config;
pub mod run;
pub mod units;

pub use config::execute as config;
pub use run::execute as run;
pub use units::execute as units;
