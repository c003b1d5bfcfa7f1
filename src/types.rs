//! Shared data structures for the calnotes application.
//!
//! This module contains the snapshot type the repository loads and commits,
//! and the subcommands of the command-line interface.
use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;

use crate::{parse_date, parse_month, CalError, Note};

/// A specialized Result type for calnotes operations.
pub type Result<T> = std::result::Result<T, CalError>;

/// What was found at the notes file location when it was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesFileState {
    /// No notes file yet (first run)
    Absent,
    /// The file parsed as a note collection
    Intact,
    /// The file exists but could not be parsed; the collection reads as empty
    Corrupt,
}

/// The full note collection as loaded, with the revision it was loaded at
#[derive(Debug, Clone)]
pub struct NotesSnapshot {
    /// Revision stamped in the file, 0 when absent or corrupt
    pub revision: u64,
    /// State of the file when it was read
    pub state: NotesFileState,
    /// Notes in collection order
    pub notes: Vec<Note>,
}

impl NotesSnapshot {
    pub fn empty(state: NotesFileState) -> Self {
        Self {
            revision: 0,
            state,
            notes: Vec::new(),
        }
    }

    /// Index of the note with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

impl YearMonth {
    /// The month containing today's local date
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
    }
}

/// Available subcommands for the calnotes application
#[derive(Subcommand)]
pub enum Commands {
    /// Choose the storage directory and finish onboarding
    Setup {
        /// Directory that will hold the notes file (created if missing)
        dir: PathBuf,
    },

    /// Show onboarding and storage status
    Status,

    /// Add a note to a date
    Add {
        /// Date to file the note under (YYYY-MM-DD), defaults to today
        #[clap(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Title of the note
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the note
        #[clap(short, long, conflicts_with_all = ["file", "edit"])]
        content: Option<String>,

        /// Path to a file containing the note's content
        #[clap(short, long, conflicts_with = "edit")]
        file: Option<PathBuf>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long, conflicts_with_all = ["file", "edit"])]
        content: Option<String>,

        /// Move the note to another date (YYYY-MM-DD)
        #[clap(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Path to a file containing the new note content
        #[clap(short, long, conflicts_with = "edit")]
        file: Option<PathBuf>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Show the notes filed under one date
    Day {
        /// The date (YYYY-MM-DD)
        #[clap(value_parser = parse_date)]
        date: NaiveDate,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List notes, optionally restricted to a date range
    List {
        /// First date to include (YYYY-MM-DD)
        #[clap(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD)
        #[clap(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show a month calendar marking days that have notes
    Month {
        /// The month (YYYY-MM), defaults to the current month
        #[clap(value_parser = parse_month)]
        month: Option<YearMonth>,
    },
}
