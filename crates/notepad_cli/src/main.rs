//! Terminal host for the notepad core.
//!
//! # Responsibility
//! - Parse command-line options and bootstrap logging and configuration.
//! - Drive one editor session per invocation against the SQLite store.
//! - Flush pending saves before exit and report failures via exit status.

mod commands;
mod terminal;

use clap::Parser;
use commands::{Cli, Commands, NoteCommand};
use log::info;
use notepad_core::format::{count_label, relative_stamp};
use notepad_core::model::note::format_timestamp;
use notepad_core::{
    char_count, default_log_level, init_logging, open_db, render_document, sanitize_markup,
    word_count, Clock, ConfigError, DbError, EditorSession, LoggingError, Note, NoteId, NoteStore,
    RepoError, SaveStatus, SqliteKvRepository, StoreConfig, SystemClock,
};
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use terminal::{short_id, TerminalSurface};

type Session<'conn> = EditorSession<SqliteKvRepository<'conn>, SystemClock, TerminalSurface>;

#[derive(Debug)]
enum CliError {
    Io(std::io::Error),
    Db(DbError),
    Repo(RepoError),
    Config(ConfigError),
    Logging(LoggingError),
    NoteNotFound(String),
    AmbiguousId(String),
    SaveFailed,
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "no note matches `{id}`"),
            Self::AmbiguousId(id) => write!(f, "`{id}` matches more than one note"),
            Self::SaveFailed => write!(f, "changes could not be saved"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, &absolute(log_dir)?)?;
    }

    let command = match cli.command {
        Commands::Sanitize { markup, stdin } => {
            let raw = read_input(markup.as_deref(), stdin)?;
            println!("{}", sanitize_markup(&raw));
            return Ok(());
        }
        Commands::Note(command) => command,
    };

    let config = load_config(cli.config.as_deref())?;
    let conn = open_db(&cli.db)?;
    let repo = SqliteKvRepository::try_new(&conn)?;
    let store = NoteStore::new(repo, SystemClock, config);
    let mut session = EditorSession::start(store, TerminalSurface::new());

    let outcome = dispatch(&mut session, command);
    let status = session.flush();
    info!(
        "event=cli_exit module=cli status={} notes={}",
        status.as_str(),
        session.store().notes().len()
    );
    outcome?;
    if status == SaveStatus::Failed {
        return Err(CliError::SaveFailed);
    }
    Ok(())
}

fn dispatch(session: &mut Session<'_>, command: NoteCommand) -> Result<(), CliError> {
    match command {
        NoteCommand::List { filter } => {
            session.on_filter_input(filter.as_deref().unwrap_or_default());
            session.surface().print_rows();
        }
        NoteCommand::New {
            title,
            content,
            stdin,
        } => {
            let id = session.on_new();
            if let Some(title) = title {
                session.on_title_input(&title);
            }
            if content.is_some() || stdin {
                let markup = read_input(content.as_deref(), stdin)?;
                set_editor(session, markup);
            }
            println!("Created {}", short_id(&id));
        }
        NoteCommand::Show { id } => {
            let note = match id {
                Some(raw) => {
                    let id = resolve_id(session.store().notes(), &raw)?;
                    find_note(session.store().notes(), &id)?
                }
                None => session
                    .store()
                    .current()
                    .ok_or_else(|| CliError::NoteNotFound("selection".to_string()))?,
            };
            print_note(session, &note);
        }
        NoteCommand::Select { id } => {
            let id = resolve_id(session.store().notes(), &id)?;
            session.on_select(&id);
            println!("Selected {} {}", short_id(&id), session.surface().title);
        }
        NoteCommand::Title { text } => {
            session.on_title_input(&text);
            let title = session.store().current().map(|note| note.title);
            println!("Renamed to {}", title.unwrap_or_default());
        }
        NoteCommand::Edit { content, stdin } => {
            let markup = read_input(content.as_deref(), stdin)?;
            set_editor(session, markup);
            println!("Updated ({})", session.surface().word_count);
        }
        NoteCommand::Duplicate => {
            if let Some(id) = session.on_duplicate() {
                println!("Created {} {}", short_id(&id), session.surface().title);
            }
        }
        NoteCommand::Delete { force } => match session.on_delete(force) {
            Some(removed) => println!("Deleted {}", short_id(&removed.id)),
            None => println!("Cancelled."),
        },
        NoteCommand::Export { out } => {
            let note = session
                .store()
                .current()
                .ok_or_else(|| CliError::NoteNotFound("selection".to_string()))?;
            let document = render_document(&note);
            std::fs::create_dir_all(&out)?;
            let path = out.join(&document.file_name);
            std::fs::write(&path, document.html)?;
            info!("event=note_export module=cli status=ok note_id={}", note.id);
            println!("Exported {}", path.display());
        }
    }
    Ok(())
}

fn set_editor(session: &mut Session<'_>, markup: String) {
    session.surface_mut().editor = markup;
    session.on_editor_input();
}

fn print_note(session: &Session<'_>, note: &Note) {
    let now = session.store().clock().now();
    let active = session.store().active_id() == Some(note.id.as_str());
    println!("{}{}", note.title, if active { "  [selected]" } else { "" });
    println!("id:      {}", note.id);
    println!(
        "updated: {} ({})",
        relative_stamp(note.updated_at, now),
        format_timestamp(&note.updated_at)
    );
    println!(
        "length:  {}, {}",
        count_label(word_count(&note.content), "word"),
        count_label(char_count(&note.content), "char")
    );
    println!();
    println!("{}", note.content);
}

fn resolve_id(notes: &[Note], raw: &str) -> Result<NoteId, CliError> {
    let raw = raw.trim();
    if let Some(note) = notes.iter().find(|note| note.id == raw) {
        return Ok(note.id.clone());
    }
    let mut matches = notes
        .iter()
        .filter(|note| !raw.is_empty() && note.id.starts_with(raw));
    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note.id.clone()),
        (Some(_), Some(_)) => Err(CliError::AmbiguousId(raw.to_string())),
        (None, _) => Err(CliError::NoteNotFound(raw.to_string())),
    }
}

fn find_note(notes: &[Note], id: &str) -> Result<Note, CliError> {
    notes
        .iter()
        .find(|note| note.id == id)
        .cloned()
        .ok_or_else(|| CliError::NoteNotFound(id.to_string()))
}

fn read_input(inline: Option<&str>, from_stdin: bool) -> Result<String, CliError> {
    if from_stdin {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(inline.unwrap_or_default().to_string())
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig, CliError> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let raw = std::fs::read_to_string(path)?;
    Ok(StoreConfig::from_json_str(&raw)?)
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::{resolve_id, CliError};
    use notepad_core::{Clock, ManualClock, Note};

    fn note_with_id(id: &str) -> Note {
        let mut note = Note::new("t", "<p></p>", ManualClock::at_epoch_ms(0).now());
        note.id = id.to_string();
        note
    }

    #[test]
    fn ids_resolve_by_exact_match_or_unique_prefix() {
        let notes = vec![note_with_id("abc123"), note_with_id("abd456"), note_with_id("ab")];

        assert_eq!(resolve_id(&notes, "ab").unwrap(), "ab");
        assert_eq!(resolve_id(&notes, "abc").unwrap(), "abc123");
        assert!(matches!(resolve_id(&notes, "abx"), Err(CliError::NoteNotFound(_))));
        assert!(matches!(resolve_id(&notes, "a"), Err(CliError::AmbiguousId(_))));
    }
}
