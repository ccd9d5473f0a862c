use std::fmt::Debug;
use std::io;

use console::Term;

/// Saves the cursor position (DECSC).
pub(crate) const SAVE_CURSOR: &str = "\x1b7";
/// Restores the cursor to the last saved position (DECRC).
pub(crate) const RESTORE_CURSOR: &str = "\x1b8";
/// Returns to the start of the line and erases it.
pub(crate) const CLEAR_LINE: &str = "\r\x1b[2K";

/// A trait for minimal terminal-like behavior.
///
/// Anything that implements this trait can be used as a draw target via
/// [`DrawTarget::term_like`]. Only [`write_str`](TermLike::write_str),
/// [`write_line`](TermLike::write_line) and [`flush`](TermLike::flush) have to be
/// provided; the cursor primitives default to the usual VT100 sequences.
///
/// [`DrawTarget::term_like`]: crate::DrawTarget::term_like
pub trait TermLike: Debug + Send + Sync {
    /// Whether this target is an attended terminal that understands cursor control.
    ///
    /// When this returns `false` the poller never calls the cursor primitives and
    /// appends every pass as plain lines instead.
    fn is_term(&self) -> bool {
        true
    }

    /// Remember the current cursor position
    fn save_cursor(&self) -> io::Result<()> {
        self.write_str(SAVE_CURSOR)
    }
    /// Move the cursor back to the position remembered by [`save_cursor`](TermLike::save_cursor)
    fn restore_cursor(&self) -> io::Result<()> {
        self.write_str(RESTORE_CURSOR)
    }
    /// Clear the current line and reset the cursor to beginning of the line
    fn clear_line(&self) -> io::Result<()> {
        self.write_str(CLEAR_LINE)
    }

    /// Write a string and add a newline.
    fn write_line(&self, s: &str) -> io::Result<()>;
    /// Write a string
    fn write_str(&self, s: &str) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;
}

impl TermLike for Term {
    fn is_term(&self) -> bool {
        self.is_term()
    }

    fn save_cursor(&self) -> io::Result<()> {
        self.write_str(SAVE_CURSOR)
    }

    fn restore_cursor(&self) -> io::Result<()> {
        self.write_str(RESTORE_CURSOR)
    }

    fn clear_line(&self) -> io::Result<()> {
        self.clear_line()
    }

    fn write_line(&self, s: &str) -> io::Result<()> {
        self.write_line(s)
    }

    fn write_str(&self, s: &str) -> io::Result<()> {
        self.write_str(s)
    }

    fn flush(&self) -> io::Result<()> {
        self.flush()
    }
}
