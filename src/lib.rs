//! Calendar note-keeping library
//!
//! Notes are filed under calendar dates and stored together in a single file
//! inside a user-chosen directory. Small per-user settings record whether
//! onboarding is complete and which directory was chosen.

mod cli;
mod config;
mod errors;
mod helper;
mod note;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use storage::*;
pub use types::*;
