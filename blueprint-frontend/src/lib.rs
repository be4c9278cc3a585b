pub mod cli;
pub mod errors;
pub mod report;

pub use cli::{CliOptions, RunSummary, run};
pub use errors::FrontendError;
