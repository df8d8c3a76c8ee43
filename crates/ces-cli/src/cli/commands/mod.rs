//! CLI command handlers, one per file.

mod completions;
mod refresh;
mod rewrite;
mod run;
mod status;

pub use completions::{run_completions, run_man};
pub use refresh::run_refresh;
pub use rewrite::run_rewrite;
pub use run::run_trigger;
pub use status::run_status;
