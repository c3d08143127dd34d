//! Command-line surface
//!
//! `args` holds the clap definitions, `output` renders command results as
//! tables, JSON or one-liners.

pub mod args;
pub mod output;

pub use args::{Cli, Commands, OutputFormat};
pub use output::{print_output, TableDisplay};
