use std::{
    env, fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use which::which;

use crate::{CalError, Note, NotesFileState, NotesSnapshot, Result, YearMonth};

/// Name of the single file holding the note collection
pub const NOTES_FILE_NAME: &str = "notes.dat";

/// Layout version written into every notes file
pub const NOTES_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesFileOut<'a> {
    format_version: u32,
    revision: u64,
    notes: &'a [Note],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotesFileIn {
    format_version: u32,
    revision: u64,
    notes: Vec<Note>,
}

/// Reads the notes file at `path`.
///
/// An absent file is an empty collection. A file that cannot be parsed as a
/// note collection is also an empty collection, flagged `Corrupt`. Only I/O
/// failures while reading an existing file are returned as errors.
pub fn load_notes_file(path: &Path) -> Result<NotesSnapshot> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No notes file at {}, starting empty", path.display());
            return Ok(NotesSnapshot::empty(NotesFileState::Absent));
        }
        Err(e) => {
            error!("Failed to read notes file {}: {}", path.display(), e);
            return Err(CalError::Io(e));
        }
    };

    let parsed: NotesFileIn = match serde_json::from_slice(&bytes) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                "Notes file {} is unreadable, treating it as empty: {}",
                path.display(),
                e
            );
            return Ok(NotesSnapshot::empty(NotesFileState::Corrupt));
        }
    };

    if parsed.format_version != NOTES_FORMAT_VERSION {
        warn!(
            "Notes file {} has unsupported format version {}, treating it as empty",
            path.display(),
            parsed.format_version
        );
        return Ok(NotesSnapshot::empty(NotesFileState::Corrupt));
    }

    trace!(
        "Loaded {} notes at revision {} from {}",
        parsed.notes.len(),
        parsed.revision,
        path.display()
    );
    Ok(NotesSnapshot {
        revision: parsed.revision,
        state: NotesFileState::Intact,
        notes: parsed.notes,
    })
}

/// Serializes a whole collection stamped with `revision`
pub fn encode_notes_file(revision: u64, notes: &[Note]) -> Result<Vec<u8>> {
    let file = NotesFileOut {
        format_version: NOTES_FORMAT_VERSION,
        revision,
        notes,
    };
    serde_json::to_vec_pretty(&file).map_err(|e| {
        error!("Failed to serialize notes: {}", e);
        CalError::Serialization(e)
    })
}

/// Replaces `path` with `bytes` through a temp file in the same directory,
/// so readers see either the old content or the new content.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    trace!("Creating temporary file in directory: {}", dir.display());
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file in {}: {}", dir.display(), e);
        CalError::Io(e)
    })?;

    temp_file.write_all(bytes).map_err(|e| {
        error!("Failed to write to temporary file: {}", e);
        CalError::Io(e)
    })?;

    temp_file.flush().map_err(|e| {
        error!("Failed to flush temporary file: {}", e);
        CalError::Io(e)
    })?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        CalError::Io(e.error)
    })?;

    Ok(())
}

/// Moves an unreadable notes file aside and returns where it went
pub fn quarantine_corrupt_file(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| NOTES_FILE_NAME.to_string());
    let target = path.with_file_name(format!(
        "{}.corrupt-{}",
        file_name,
        Local::now().format("%Y%m%d%H%M%S%3f")
    ));

    fs::rename(path, &target).map_err(|e| {
        error!(
            "Failed to move corrupt notes file {} aside: {}",
            path.display(),
            e
        );
        CalError::Io(e)
    })?;

    warn!(
        "Moved unreadable notes file {} to {}",
        path.display(),
        target.display()
    );
    Ok(target)
}

/// Parses a `YYYY-MM-DD` argument
pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected a date as YYYY-MM-DD, got '{}': {}", value, e))
}

/// Parses a `YYYY-MM` argument
pub fn parse_month(value: &str) -> std::result::Result<YearMonth, String> {
    use chrono::Datelike;

    let first = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|e| format!("expected a month as YYYY-MM, got '{}': {}", value, e))?;
    Ok(YearMonth {
        year: first.year(),
        month: first.month(),
    })
}

/// Trims a title and rejects it if nothing is left
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CalError::InvalidInput {
            message: "title cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

pub fn normalize_content(content: Option<&str>) -> String {
    content.map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Expands a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Picks the editor command: `$VISUAL`, `$EDITOR`, then a platform default
pub fn resolve_editor_command() -> String {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return editor;
            }
        }
    }

    if cfg!(windows) {
        "notepad".to_string()
    } else if cfg!(target_os = "macos") {
        "open -W -t".to_string()
    } else {
        for editor in &["nano", "vim", "vi"] {
            if which(editor).is_ok() {
                return editor.to_string();
            }
        }
        "vi".to_string()
    }
}

/// First non-empty line of `content`, cut to `max_chars` characters
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
