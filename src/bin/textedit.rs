//! A tiny raw-mode text editor, spawned by the shell's `textedit` builtin.
//!
//! The editor keeps the whole file as a vector of lines, redraws the text
//! area after every keystroke, and only touches the file on an explicit
//! save. Quitting returns control (and the terminal) to the shell.

use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use std::fs;
use std::io::{self, Write};

/// Upper bound on the number of lines held in the buffer.
const MAX_LINES: usize = 1024;

/// Upper bound on the length of a single line, in characters.
const MAX_LINE_LEN: usize = 256;

/// Rows taken by the header; the text area starts below it.
const HEADER_ROWS: u16 = 4;

const COLORS: [Color; 7] = [
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::White,
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextStyle {
    Normal,
    Bold,
    Dim,
}

impl TextStyle {
    fn next(self) -> Self {
        match self {
            TextStyle::Normal => TextStyle::Bold,
            TextStyle::Bold => TextStyle::Dim,
            TextStyle::Dim => TextStyle::Normal,
        }
    }

    fn attribute(self) -> Attribute {
        match self {
            TextStyle::Normal => Attribute::Reset,
            TextStyle::Bold => Attribute::Bold,
            TextStyle::Dim => Attribute::Dim,
        }
    }
}

struct Editor {
    filename: String,
    lines: Vec<String>,
    cur_line: usize,
    cur_col: usize,
    style: TextStyle,
    color_idx: usize,
    status: Option<String>,
}

impl Editor {
    /// Load `filename` into the buffer, or start with one empty line when
    /// the file does not exist yet.
    fn open(filename: String) -> Result<Self> {
        let lines = match fs::read_to_string(&filename) {
            Ok(text) => {
                let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
                if lines.is_empty() {
                    lines.push(String::new());
                }
                lines.truncate(MAX_LINES);
                lines
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => vec![String::new()],
            Err(e) => return Err(e).with_context(|| format!("could not open '{}'", filename)),
        };

        Ok(Self {
            filename,
            lines,
            cur_line: 0,
            cur_col: 0,
            style: TextStyle::Normal,
            color_idx: COLORS.len() - 1,
            status: None,
        })
    }

    fn save(&mut self) {
        let mut text = self.lines.join("\n");
        text.push('\n');
        self.status = match fs::write(&self.filename, text) {
            Ok(()) => Some("[saved]".to_string()),
            Err(e) => Some(format!("save failed: {}", e)),
        };
    }

    fn current_line_len(&self) -> usize {
        self.lines[self.cur_line].len()
    }

    fn move_up(&mut self) {
        if self.cur_line > 0 {
            self.cur_line -= 1;
            self.cur_col = self.cur_col.min(self.current_line_len());
        }
    }

    fn move_down(&mut self) {
        if self.cur_line + 1 < self.lines.len() {
            self.cur_line += 1;
            self.cur_col = self.cur_col.min(self.current_line_len());
        }
    }

    fn move_left(&mut self) {
        self.cur_col = self.cur_col.saturating_sub(1);
    }

    fn move_right(&mut self) {
        if self.cur_col < self.current_line_len() {
            self.cur_col += 1;
        }
    }

    /// Insert a printable character at the cursor.
    fn insert(&mut self, c: char) {
        if !c.is_ascii() || c.is_ascii_control() {
            return;
        }
        if self.current_line_len() >= MAX_LINE_LEN {
            return;
        }
        let col = self.cur_col.min(self.current_line_len());
        self.lines[self.cur_line].insert(col, c);
        self.cur_col = col + 1;
    }

    /// Split the current line at the cursor.
    fn newline(&mut self) {
        if self.lines.len() >= MAX_LINES {
            return;
        }
        let col = self.cur_col.min(self.current_line_len());
        let rest = self.lines[self.cur_line].split_off(col);
        self.lines.insert(self.cur_line + 1, rest);
        self.cur_line += 1;
        self.cur_col = 0;
    }

    /// Delete the character before the cursor, merging with the previous
    /// line at column zero.
    fn backspace(&mut self) {
        if self.cur_col > 0 {
            self.cur_col -= 1;
            self.lines[self.cur_line].remove(self.cur_col);
        } else if self.cur_line > 0 {
            let prev_len = self.lines[self.cur_line - 1].len();
            if prev_len + self.current_line_len() >= MAX_LINE_LEN {
                return;
            }
            let removed = self.lines.remove(self.cur_line);
            self.cur_line -= 1;
            self.lines[self.cur_line].push_str(&removed);
            self.cur_col = prev_len;
        }
    }

    fn draw(&self, out: &mut impl Write) -> Result<()> {
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
        queue!(
            out,
            SetForegroundColor(Color::Blue),
            Print("--- krill text editor ---\r\n"),
            SetForegroundColor(Color::Yellow),
            Print("(Ctrl+S save, Ctrl+Q quit, Ctrl+F style, Ctrl+R color)\r\n"),
            SetForegroundColor(Color::Cyan),
            Print("(arrows move, Enter new line, Backspace delete)\r\n"),
            ResetColor,
            Print("\r\n"),
        )?;

        queue!(
            out,
            SetAttribute(self.style.attribute()),
            SetForegroundColor(COLORS[self.color_idx]),
        )?;
        for line in &self.lines {
            queue!(out, Print(line), Print("\r\n"))?;
        }
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;

        if let Some(status) = &self.status {
            queue!(out, Print(status), Print("\r\n"))?;
        }

        queue!(
            out,
            MoveTo(self.cur_col as u16, self.cur_line as u16 + HEADER_ROWS)
        )?;
        out.flush()?;
        Ok(())
    }

    /// Handle one key press. Returns false when the editor should quit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status = None;
        if modifiers.contains(KeyModifiers::CONTROL) {
            match code {
                KeyCode::Char('q') | KeyCode::Char('c') => return false,
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('f') => self.style = self.style.next(),
                KeyCode::Char('r') => self.color_idx = (self.color_idx + 1) % COLORS.len(),
                _ => {}
            }
            return true;
        }
        match code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Enter => self.newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) => self.insert(c),
            _ => {}
        }
        true
    }
}

/// Restores the terminal even when the edit session errors out.
struct TerminalSession;

impl TerminalSession {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("could not enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn run(filename: String) -> Result<()> {
    let mut editor = Editor::open(filename)?;

    let _session = TerminalSession::enter()?;
    let mut out = io::stdout();
    editor.draw(&mut out)?;

    loop {
        if let Event::Key(key) = event::read().context("could not read key event")? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !editor.handle_key(key.code, key.modifiers) {
                break;
            }
            editor.draw(&mut out)?;
        }
    }
    Ok(())
}

fn main() {
    let Some(filename) = std::env::args().nth(1) else {
        eprintln!("Usage: textedit <filename>");
        std::process::exit(1);
    };

    match run(filename) {
        Ok(()) => println!("Exited editor."),
        Err(e) => {
            eprintln!("textedit: {:#}", e);
            std::process::exit(1);
        }
    }
}
