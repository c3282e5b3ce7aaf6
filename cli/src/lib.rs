pub mod commands;
pub mod context;
pub mod repl;
pub mod sink;

pub use context::CliContext;
pub use repl::readline;
