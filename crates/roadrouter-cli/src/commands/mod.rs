// Handlers for CLI subcommands.
//
// main.rs parses arguments and dispatches here; each module owns one subcommand.

pub mod preprocess;
pub mod route;
