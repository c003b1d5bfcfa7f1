use std::{collections::BTreeMap, path::PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::{
    encode_notes_file, load_notes_file, quarantine_corrupt_file, write_atomically, CalError,
    ConfigStore, Note, NotesFileState, NotesSnapshot, Result, YearMonth, NOTES_FILE_NAME,
};

/// Stores the whole note collection as one file in the configured directory.
///
/// Every operation resolves the directory through the [`ConfigStore`] anew,
/// so a directory that was moved or deleted is noticed on the next call.
/// Mutations load the full collection, change it in memory and write it back
/// in one piece.
pub struct NoteRepository {
    config: ConfigStore,
}

impl NoteRepository {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Path of the notes file inside the configured storage directory
    pub fn notes_file(&self) -> Result<PathBuf> {
        let dir = self.config.resolve_storage_directory()?;
        let path = dir.join(NOTES_FILE_NAME);
        debug!("Notes file resolved to {}", path.display());
        Ok(path)
    }

    /// Loads the collection together with its revision and file state
    pub fn load_snapshot(&self) -> Result<NotesSnapshot> {
        let path = self.notes_file()?;
        load_notes_file(&path)
    }

    /// All notes in collection order.
    ///
    /// A missing notes file and an unparsable one both read as an empty
    /// collection; use [`load_snapshot`](Self::load_snapshot) to tell them
    /// apart.
    pub fn get_notes(&self) -> Result<Vec<Note>> {
        Ok(self.load_snapshot()?.notes)
    }

    /// Overwrites the notes file with `notes`, regardless of what is on disk.
    ///
    /// An unreadable file is moved aside before it is replaced.
    pub fn save_notes(&self, notes: &[Note]) -> Result<()> {
        let path = self.notes_file()?;
        let current = load_notes_file(&path)?;
        let revision = current.revision + 1;

        if current.state == NotesFileState::Corrupt {
            quarantine_corrupt_file(&path)?;
        }

        write_atomically(&path, &encode_notes_file(revision, notes)?)?;
        info!("Saved {} notes at revision {}", notes.len(), revision);
        Ok(())
    }

    /// Writes `snapshot` back if nobody changed the file since it was loaded.
    ///
    /// Fails with `Conflict` when the revision on disk differs from the one
    /// the snapshot was loaded at. An unreadable file is moved aside before
    /// it is replaced. Returns the new revision.
    pub fn commit(&self, snapshot: &NotesSnapshot) -> Result<u64> {
        let path = self.notes_file()?;
        let current = load_notes_file(&path)?;

        if current.revision != snapshot.revision {
            warn!(
                "Refusing to save: loaded revision {}, on disk {}",
                snapshot.revision, current.revision
            );
            return Err(CalError::Conflict {
                expected_revision: snapshot.revision,
                actual_revision: current.revision,
            });
        }

        if current.state == NotesFileState::Corrupt {
            quarantine_corrupt_file(&path)?;
        }

        let revision = snapshot.revision + 1;
        write_atomically(&path, &encode_notes_file(revision, &snapshot.notes)?)?;
        debug!(
            "Committed {} notes at revision {}",
            snapshot.notes.len(),
            revision
        );
        Ok(revision)
    }

    /// Appends `note` to the collection
    pub fn add_note(&self, note: Note) -> Result<()> {
        let mut snapshot = self.load_snapshot()?;
        if snapshot.position(&note.id).is_some() {
            return Err(CalError::NoteAlreadyExists { id: note.id });
        }

        info!("Adding note {} on {}", note.id, note.date);
        snapshot.notes.push(note);
        self.commit(&snapshot)?;
        Ok(())
    }

    /// Replaces title, content and date of the note with the same id, in place.
    ///
    /// The stored id and creation time are kept. Returns `false` and leaves
    /// the file untouched when no note has that id.
    pub fn update_note(&self, note: &Note) -> Result<bool> {
        let mut snapshot = self.load_snapshot()?;
        let Some(index) = snapshot.position(&note.id) else {
            debug!("Update skipped, no note with id {}", note.id);
            return Ok(false);
        };

        let stored = &mut snapshot.notes[index];
        stored.date = note.date;
        stored.title = note.title.clone();
        stored.content = note.content.clone();

        self.commit(&snapshot)?;
        info!("Updated note {}", note.id);
        Ok(true)
    }

    /// Removes the note with the same id as `note`
    pub fn delete_note(&self, note: &Note) -> Result<bool> {
        self.delete_note_by_id(&note.id)
    }

    /// Removes the note with `id`.
    ///
    /// An empty id is a no-op. Returns `false` and leaves the file untouched
    /// when no note matched.
    pub fn delete_note_by_id(&self, id: &str) -> Result<bool> {
        if id.is_empty() {
            return Ok(false);
        }

        let mut snapshot = self.load_snapshot()?;
        let before = snapshot.notes.len();
        snapshot.notes.retain(|n| n.id != id);

        if snapshot.notes.len() == before {
            debug!("Delete skipped, no note with id {}", id);
            return Ok(false);
        }

        self.commit(&snapshot)?;
        info!("Deleted note {}", id);
        Ok(true)
    }

    /// The note with `id`, if any
    pub fn get_note(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.get_notes()?.into_iter().find(|n| n.id == id))
    }

    /// Notes filed under `date`, in collection order
    pub fn get_notes_for_date(&self, date: NaiveDate) -> Result<Vec<Note>> {
        Ok(self
            .get_notes()?
            .into_iter()
            .filter(|n| n.date == date)
            .collect())
    }

    /// Notes filed between `start` and `end` inclusive, in collection order
    pub fn get_notes_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Note>> {
        Ok(self
            .get_notes()?
            .into_iter()
            .filter(|n| n.date >= start && n.date <= end)
            .collect())
    }

    /// Number of notes on each day of `month` that has any
    pub fn note_counts_for_month(&self, month: YearMonth) -> Result<BTreeMap<NaiveDate, usize>> {
        let (Some(start), Some(end)) = (month.first_day(), month.last_day()) else {
            return Err(CalError::InvalidInput {
                message: format!("no such month: {}-{:02}", month.year, month.month),
            });
        };

        let mut counts = BTreeMap::new();
        for note in self.get_notes_between(start, end)? {
            *counts.entry(note.date).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
