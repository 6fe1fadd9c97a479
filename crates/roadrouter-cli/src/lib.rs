//! roadrouter CLI library.
//!
//! Loading of network documents, the subcommand handlers and output
//! rendering live here so they can be tested without spawning the binary.

pub mod commands;
pub mod network_file;
pub mod output;
