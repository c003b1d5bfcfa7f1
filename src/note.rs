//! The dated note entity.
//!
//! A note is filed under a calendar date (no time zone) and keeps the local
//! timestamp of its creation. Its id never changes once assigned.
use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single journal entry filed under a calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, never reused
    pub id: String,
    /// Calendar date the note is filed under
    pub date: NaiveDate,
    /// Short label
    pub title: String,
    /// Free-form body, may be empty
    pub content: String,
    /// When the note was created
    pub created_at: NaiveDateTime,
}

impl Note {
    /// Creates a new note with a fresh id and the current local time
    pub fn new(date: NaiveDate, title: String, content: String) -> Self {
        Note {
            id: format!("note-{}", Uuid::new_v4()),
            date,
            title,
            content,
            created_at: Local::now().naive_local(),
        }
    }

    /// Returns a copy carrying new editable fields, keeping id and creation time
    pub fn revised(&self, date: NaiveDate, title: String, content: String) -> Self {
        Note {
            id: self.id.clone(),
            date,
            title,
            content,
            created_at: self.created_at,
        }
    }

    /// Text shown when listing: the title, or the content if the title is blank
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.content
        } else {
            &self.title
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_notes_get_distinct_prefixed_ids() {
        let a = Note::new(day(2024, 1, 1), "A".into(), String::new());
        let b = Note::new(day(2024, 1, 1), "A".into(), String::new());

        assert!(a.id.starts_with("note-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn revised_keeps_identity_and_creation_time() {
        let original = Note::new(day(2024, 1, 1), "Draft".into(), "body".into());
        let revised = original.revised(day(2024, 2, 3), "Final".into(), String::new());

        assert_eq!(revised.id, original.id);
        assert_eq!(revised.created_at, original.created_at);
        assert_eq!(revised.date, day(2024, 2, 3));
        assert_eq!(revised.title, "Final");
        assert!(revised.content.is_empty());
    }

    #[test]
    fn label_falls_back_to_content_for_blank_title() {
        let mut note = Note::new(day(2024, 1, 1), "  ".into(), "remember milk".into());
        assert_eq!(note.to_string(), "remember milk");

        note.title = "Shopping".into();
        assert_eq!(note.label(), "Shopping");
    }

    #[test]
    fn serializes_with_camel_case_keys_and_plain_date() {
        let note = Note {
            id: "note-1".into(),
            date: day(2024, 3, 8),
            title: "T".into(),
            content: "C".into(),
            created_at: day(2024, 3, 1).and_hms_opt(9, 30, 0).unwrap(),
        };

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["date"], "2024-03-08");
        assert_eq!(value["createdAt"], "2024-03-01T09:30:00");
    }
}
