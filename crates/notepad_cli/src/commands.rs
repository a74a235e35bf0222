use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notepad")]
#[command(version, about = "Offline notepad backed by a local SQLite store")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store file (created on first use)
    #[arg(long, global = true, default_value = "notepad.sqlite3")]
    pub db: PathBuf,

    /// Directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// JSON file with store overrides (storage keys, debounce, new note title)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitize markup from an argument or stdin and print the result
    Sanitize {
        #[arg(conflicts_with = "stdin", required_unless_present = "stdin")]
        markup: Option<String>,

        #[arg(long)]
        stdin: bool,
    },

    #[command(flatten)]
    Note(NoteCommand),
}

/// Commands that open the store and run inside an editor session.
#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// List notes, newest first
    List {
        /// Only show notes whose title or text contains this keyword
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Create a note and select it
    New {
        #[arg(long, short = 't')]
        title: Option<String>,

        /// Initial markup; read from stdin with --stdin
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        #[arg(long)]
        stdin: bool,
    },

    /// Print a note (the selected one by default)
    Show {
        /// Note id or unique id prefix
        id: Option<String>,
    },

    /// Select a note
    Select {
        /// Note id or unique id prefix
        id: String,
    },

    /// Rename the selected note
    Title { text: String },

    /// Replace the selected note's content
    Edit {
        /// New markup; read from stdin with --stdin
        #[arg(long, short = 'c', conflicts_with = "stdin", required_unless_present = "stdin")]
        content: Option<String>,

        #[arg(long)]
        stdin: bool,
    },

    /// Copy the selected note
    Duplicate,

    /// Delete the selected note
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Write the selected note as a standalone HTML file
    Export {
        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,
    },
}
