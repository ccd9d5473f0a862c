use std::fmt::{Debug, Formatter};
use std::io::Write;
use std::sync::{Arc, Mutex};

use vt100::Parser;

use crate::term_like::{CLEAR_LINE, RESTORE_CURSOR, SAVE_CURSOR};
use crate::TermLike;

/// A thin wrapper around [`vt100::Parser`].
///
/// This is just an [`Arc`] around its internal state, so it can be freely cloned:
/// hand one clone to a [`DrawTarget`](crate::DrawTarget) and inspect the screen
/// through another.
#[derive(Debug, Clone)]
pub struct InMemoryTerm {
    state: Arc<Mutex<InMemoryTermState>>,
}

impl InMemoryTerm {
    pub fn new(rows: u16, cols: u16) -> InMemoryTerm {
        assert!(rows > 0, "rows must be > 0");
        assert!(cols > 0, "cols must be > 0");
        InMemoryTerm {
            state: Arc::new(Mutex::new(InMemoryTermState::new(rows, cols))),
        }
    }

    /// Returns the visible screen, one row per line, without trailing empty rows.
    pub fn contents(&self) -> String {
        let state = self.state.lock().unwrap();

        // `Screen::contents` drops the row breaks, so rebuild them row by row.
        let mut rows = state
            .parser
            .screen()
            .rows(0, state.width)
            .collect::<Vec<_>>();

        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        rows.join("\n")
    }

    /// Returns the cursor position as `(row, col)`.
    pub fn cursor_position(&self) -> (u16, u16) {
        self.state.lock().unwrap().parser.screen().cursor_position()
    }
}

impl TermLike for InMemoryTerm {
    fn save_cursor(&self) -> std::io::Result<()> {
        self.state.lock().unwrap().write_str(SAVE_CURSOR)
    }

    fn restore_cursor(&self) -> std::io::Result<()> {
        self.state.lock().unwrap().write_str(RESTORE_CURSOR)
    }

    fn clear_line(&self) -> std::io::Result<()> {
        self.state.lock().unwrap().write_str(CLEAR_LINE)
    }

    fn write_line(&self, s: &str) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();

        debug_assert!(
            s.lines().count() <= 1,
            "calling write_line with embedded newlines is not allowed"
        );

        // vt100 needs the full \r\n sequence to jump to the next line and reset the cursor to
        // the beginning of the line.
        state.write_str(s)?;
        state.write_str("\r\n")
    }

    fn write_str(&self, s: &str) -> std::io::Result<()> {
        self.state.lock().unwrap().write_str(s)
    }

    fn flush(&self) -> std::io::Result<()> {
        self.state.lock().unwrap().parser.flush()
    }
}

struct InMemoryTermState {
    width: u16,
    parser: vt100::Parser,
}

impl InMemoryTermState {
    fn new(rows: u16, cols: u16) -> InMemoryTermState {
        InMemoryTermState {
            width: cols,
            parser: Parser::new(rows, cols, 0),
        }
    }

    fn write_str(&mut self, s: &str) -> std::io::Result<()> {
        self.parser.write_all(s.as_bytes())
    }
}

impl Debug for InMemoryTermState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTermState").finish_non_exhaustive()
    }
}
