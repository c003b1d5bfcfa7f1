//! Command handling for the calnotes CLI
//!
//! `App` plays the role of the calendar front end: it validates user input,
//! builds notes and calls into the repository through its query/command
//! surface.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use chrono::{Datelike, Local, NaiveDate};
use console::style;
use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    content_preview, expand_home, normalize_content, normalize_title, resolve_editor_command,
    CalError, Commands, Note, NoteRepository, NotesFileState, Result, YearMonth,
};

/// CLI Application handler - processes CLI commands and interfaces with NoteRepository
pub struct App {
    /// The note repository backend
    repository: NoteRepository,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    pub fn new(repository: NoteRepository, verbose: bool) -> Self {
        Self {
            repository,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Setup { dir } => self.handle_setup(&dir),
            Commands::Status => self.handle_status(),
            Commands::Add {
                date,
                title,
                content,
                file,
                edit,
            } => self.handle_add(date, title, content, file, edit),
            Commands::Edit {
                id,
                title,
                content,
                date,
                file,
                edit,
            } => self.handle_edit(id, title, content, date, file, edit),
            Commands::Delete { id, force } => self.handle_delete(id, force),
            Commands::Day { date, json } => self.handle_day(date, json),
            Commands::List { from, to, json } => self.handle_list(from, to, json),
            Commands::Month { month } => self.handle_month(month.unwrap_or_else(YearMonth::current)),
        }
    }

    fn handle_setup(&self, dir: &Path) -> Result<()> {
        let dir = self.repository.config().choose_directory(&expand_home(dir))?;
        println!("Notes will be stored in {}", dir.display());
        Ok(())
    }

    fn handle_status(&self) -> Result<()> {
        let config = self.repository.config();
        println!(
            "Onboarded:         {}",
            if config.is_onboarded() { "yes" } else { "no" }
        );

        let Some(dir) = config.storage_directory() else {
            println!("Storage directory: not set");
            return Ok(());
        };
        println!("Storage directory: {}", dir.display());

        if !config.has_storage_directory() {
            println!("{}", style("The storage directory no longer exists.").red());
            return Ok(());
        }

        let snapshot = self.repository.load_snapshot()?;
        println!("Notes:             {}", snapshot.notes.len());
        if self.verbose {
            println!("Revision:          {}", snapshot.revision);
        }
        if snapshot.state == NotesFileState::Corrupt {
            println!(
                "{}",
                style("The notes file could not be read; it will be moved aside on the next change.")
                    .yellow()
            );
        }
        Ok(())
    }

    fn handle_add(
        &self,
        date: Option<NaiveDate>,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
    ) -> Result<()> {
        let title = normalize_title(&title)?;
        let date = date.unwrap_or_else(|| Local::now().date_naive());

        let raw_content = match (content, file) {
            (Some(c), _) => c,
            (None, Some(file_path)) => self.read_content_from_file(&file_path)?,
            (None, None) if edit => self.open_editor_with_content(&title, "")?,
            (None, None) => String::new(),
        };

        let note = Note::new(date, title, normalize_content(Some(&raw_content)));
        let id = note.id.clone();
        self.repository.add_note(note)?;

        println!("Note created with ID: {}", id);
        Ok(())
    }

    fn handle_edit(
        &self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        date: Option<NaiveDate>,
        file: Option<PathBuf>,
        edit: bool,
    ) -> Result<()> {
        let existing = self
            .repository
            .get_note(&id)?
            .ok_or_else(|| CalError::NoteNotFound { id: id.clone() })?;

        let title = match title {
            Some(t) => normalize_title(&t)?,
            None => existing.title.clone(),
        };

        let content = match (content, file) {
            (Some(c), _) => normalize_content(Some(&c)),
            (None, Some(file_path)) => normalize_content(Some(&self.read_content_from_file(&file_path)?)),
            (None, None) if edit => normalize_content(Some(
                &self.open_editor_with_content(&title, &existing.content)?,
            )),
            (None, None) => existing.content.clone(),
        };

        let revised = existing.revised(date.unwrap_or(existing.date), title, content);
        if revised == existing {
            println!("No changes to note {}", id);
            return Ok(());
        }

        if !self.repository.update_note(&revised)? {
            return Err(CalError::NoteNotFound { id });
        }

        println!("Note {} updated", id);
        Ok(())
    }

    fn handle_delete(&self, id: String, force: bool) -> Result<()> {
        let note = self
            .repository
            .get_note(&id)?
            .ok_or_else(|| CalError::NoteNotFound { id: id.clone() })?;

        if !force {
            println!("You are about to delete the following note:");
            println!("ID:      {}", note.id);
            println!("Date:    {}", note.date);
            println!("Title:   {}", note.title);
            let preview = content_preview(&note.content, 80);
            if !preview.is_empty() {
                println!("Content: {}", preview);
            }

            print!("\nThis action cannot be undone! Delete this note? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        if !self.repository.delete_note(&note)? {
            return Err(CalError::NoteNotFound { id });
        }

        println!("Note '{}' ({}) has been deleted.", note.title, note.id);
        Ok(())
    }

    fn handle_day(&self, date: NaiveDate, json: bool) -> Result<()> {
        let notes = self.repository.get_notes_for_date(date)?;
        self.display_notes(&notes, json)
    }

    fn handle_list(&self, from: Option<NaiveDate>, to: Option<NaiveDate>, json: bool) -> Result<()> {
        let notes = match (from, to) {
            (None, None) => self.repository.get_notes()?,
            (from, to) => {
                let start = from.unwrap_or(NaiveDate::MIN);
                let end = to.unwrap_or(NaiveDate::MAX);
                if start > end {
                    return Err(CalError::InvalidInput {
                        message: format!("--from {} is after --to {}", start, end),
                    });
                }
                self.repository.get_notes_between(start, end)?
            }
        };
        self.display_notes(&notes, json)
    }

    fn handle_month(&self, month: YearMonth) -> Result<()> {
        let counts = self.repository.note_counts_for_month(month)?;
        let (Some(first), Some(last)) = (month.first_day(), month.last_day()) else {
            return Ok(());
        };

        println!("{}", style(first.format("%B %Y")).bold());
        println!("Mo  Tu  We  Th  Fr  Sa  Su");

        let today = Local::now().date_naive();
        let offset = first.weekday().num_days_from_monday() as usize;
        let mut line = "    ".repeat(offset);
        let mut column = offset;

        for day in first.iter_days().take_while(|d| *d <= last) {
            let marker = if counts.contains_key(&day) { "*" } else { " " };
            let cell = format!("{:>2}{}", day.day(), marker);
            let cell = if day == today {
                style(cell).reverse().to_string()
            } else if counts.contains_key(&day) {
                style(cell).cyan().to_string()
            } else {
                cell
            };
            line.push_str(&cell);
            line.push(' ');

            column += 1;
            if column == 7 {
                println!("{}", line.trim_end());
                line.clear();
                column = 0;
            }
        }
        if !line.is_empty() {
            println!("{}", line.trim_end());
        }

        if !counts.is_empty() {
            println!();
            for (day, count) in &counts {
                println!(
                    "{}  {} note{}",
                    day,
                    count,
                    if *count == 1 { "" } else { "s" }
                );
            }
        }
        Ok(())
    }

    fn display_notes(&self, notes: &[Note], json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No notes found.");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            println!(
                "{} | {} | Created: {}",
                note.date,
                note.id,
                note.created_at.format("%Y-%m-%d %H:%M")
            );
            println!("{}", style(note.label()).bold());

            if self.verbose {
                if !note.content.is_empty() {
                    println!("\n{}", note.content);
                }
            } else {
                let preview = content_preview(&note.content, term_width.saturating_sub(10).max(20));
                if !preview.is_empty() {
                    println!("{}", preview);
                }
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn read_content_from_file(&self, file_path: &Path) -> Result<String> {
        if !file_path.exists() {
            return Err(CalError::FileNotFound {
                file_path: file_path.display().to_string(),
            });
        }
        Ok(read_to_string(file_path)?)
    }

    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        self.write_editor_template(&temp_path, title, existing_content)?;

        let editor_cmd = resolve_editor_command();
        info!("Opening editor '{}' for note content", editor_cmd);
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(strip_editor_comments(&content))
    }

    fn write_editor_template(&self, path: &Path, title: &str, existing_content: &str) -> Result<()> {
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;

        writeln!(file, "<!-- Note: {} -->", title)?;
        writeln!(
            file,
            "<!-- Write the note below. Lines like this one are ignored. Save and exit when done. -->"
        )?;
        write!(file, "{}", existing_content)?;

        Ok(())
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| CalError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(CalError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program).args(rest).arg(file_path).status()?;

        if !status.success() {
            return Err(CalError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }
}

/// Drops the single-line `<!-- ... -->` comments the editor template adds
fn strip_editor_comments(content: &str) -> String {
    content
        .lines()
        .filter(|line| {
            let line = line.trim();
            !(line.starts_with("<!--") && line.ends_with("-->"))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}
