//! # CLI Behavior
//!
//! This is **one possible UI client** for campus, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and
//! output formatting.
//!
//! ## Output
//!
//! Results go to stdout: colored tables and messages by default, one JSON
//! document with `--json`. Logs and errors go to stderr, so `--json` output
//! can always be piped.
//!
//! ## Lists
//!
//! Every `list` command takes `--search`, its resource's filter flags and
//! `--page`. Filters take a value or `all`.
//!
//! ## Module Structure
//!
//! - `commands`: per-command handlers that call the API and print results
//! - `render`: output formatting (tables, colors, messages)
//! - `setup`: argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
