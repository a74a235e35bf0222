//! Terminal rendering surface.
//!
//! Holds the last state pushed by the session so commands can print it once
//! at the end instead of on every redraw.

use log::debug;
use notepad_core::{Note, NoteRow, SaveStatus, Surface};
use std::io::{self, BufRead, IsTerminal, Write};

#[derive(Debug, Default)]
pub struct TerminalSurface {
    pub editor: String,
    pub title: String,
    pub rows: Vec<NoteRow>,
    pub actions_enabled: bool,
    pub word_count: String,
    pub status: Option<SaveStatus>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_rows(&self) {
        if self.rows.is_empty() {
            println!("No notes match.");
            return;
        }
        for row in &self.rows {
            let marker = if row.is_active { '*' } else { ' ' };
            println!(
                "{marker} {}  {}  ({}, {})",
                short_id(&row.id),
                row.title,
                row.updated_label,
                row.length_label
            );
        }
    }
}

impl Surface for TerminalSurface {
    fn editor_markup(&self) -> String {
        self.editor.clone()
    }

    fn set_editor_markup(&mut self, markup: &str) {
        self.editor = markup.to_string();
    }

    fn set_title_input(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn render_list(&mut self, rows: &[NoteRow]) {
        self.rows = rows.to_vec();
    }

    fn set_actions_enabled(&mut self, enabled: bool) {
        self.actions_enabled = enabled;
    }

    fn set_word_count(&mut self, label: &str) {
        self.word_count = label.to_string();
    }

    fn set_save_status(&mut self, status: SaveStatus) {
        self.status = Some(status);
    }

    fn confirm_delete(&mut self, note: &Note) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            eprintln!("Refusing to delete without a terminal; pass --force.");
            return false;
        }
        eprint!("Delete \"{}\"? [y/N] ", note.title);
        if let Err(err) = io::stderr().flush() {
            debug!("event=confirm_prompt module=cli status=error error={err}");
        }

        let mut answer = String::new();
        if let Err(err) = stdin.lock().read_line(&mut answer) {
            debug!("event=confirm_prompt module=cli status=error error={err}");
            return false;
        }
        is_confirmation(&answer)
    }
}

fn is_confirmation(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// First eight characters of an id, enough to address it by prefix.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
