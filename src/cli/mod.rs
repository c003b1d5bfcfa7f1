//! Command-line front end: argument parsing and command handling.

mod app;
mod args;

pub use app::*;
pub use args::*;
