// External data source module.
// Typed access to run records via the gh command-line tool.

pub mod cli;
pub mod types;

pub use cli::{BrowseTarget, DataSource, GhCli};
pub use types::{Run, RunConclusion, RunStatus};
