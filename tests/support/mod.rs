mod cli;
mod workspace;

pub use cli::{CliOutput, CliRunner};
pub use workspace::{TestWorkspace, TestWorkspaceBuilder};
