use std::io;

use console::Term;

use crate::TermLike;

/// Target for draw operations
///
/// This tells a [`Poller`](crate::Poller) where to paint to. Terminal targets
/// are redrawn in place; targets that are not attended terminals (for example
/// a `Term` whose output is redirected to a file) receive every pass as plain
/// appended lines without any cursor control sequences.
#[derive(Debug)]
pub struct DrawTarget {
    kind: TargetKind,
}

impl DrawTarget {
    /// Draw to a buffered stdout terminal.
    ///
    /// This is the default draw target for pollers.
    pub fn stdout() -> Self {
        Self::term(Term::buffered_stdout())
    }

    /// Draw to a buffered stderr terminal.
    pub fn stderr() -> Self {
        Self::term(Term::buffered_stderr())
    }

    /// Draw to a terminal.
    ///
    /// If the terminal is not user attended the output falls back to plain
    /// sequential lines, so piping to a file does not fill it with escape codes.
    pub fn term(term: Term) -> Self {
        Self {
            kind: TargetKind::Term { term },
        }
    }

    /// Draw to a boxed object that implements the [`TermLike`] trait.
    pub fn term_like(term_like: Box<dyn TermLike>) -> Self {
        Self {
            kind: TargetKind::TermLike { inner: term_like },
        }
    }

    /// A hidden draw target.
    ///
    /// Nothing is rendered, but a poller drawing here still runs until its
    /// indicators complete or it is canceled.
    pub fn hidden() -> Self {
        Self {
            kind: TargetKind::Hidden,
        }
    }

    /// Returns true if the draw target is hidden.
    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, TargetKind::Hidden)
    }

    /// Returns true if the target is redrawn in place.
    pub fn is_term(&self) -> bool {
        match &self.kind {
            TargetKind::Term { term } => term.is_term(),
            TargetKind::TermLike { inner } => inner.is_term(),
            TargetKind::Hidden => false,
        }
    }

    /// Returns something to draw to, or `None` for hidden targets.
    pub(crate) fn drawable(&self) -> Option<Drawable<'_>> {
        let term: &dyn TermLike = match &self.kind {
            TargetKind::Term { term } => term,
            TargetKind::TermLike { inner } => &**inner,
            TargetKind::Hidden => return None,
        };

        Some(Drawable {
            in_place: term.is_term(),
            term,
        })
    }
}

impl Default for DrawTarget {
    fn default() -> Self {
        Self::stdout()
    }
}

#[derive(Debug)]
enum TargetKind {
    Term { term: Term },
    TermLike { inner: Box<dyn TermLike> },
    Hidden,
}

/// A borrowed draw target for the duration of one session step.
///
/// Cursor control is skipped entirely when the target is not a terminal.
pub(crate) struct Drawable<'a> {
    term: &'a dyn TermLike,
    in_place: bool,
}

impl Drawable<'_> {
    /// Marks the origin of the block all passes redraw.
    pub(crate) fn begin(&self) -> io::Result<()> {
        if self.in_place {
            self.term.save_cursor()?;
        }
        self.term.flush()
    }

    /// Returns to the origin saved by [`Drawable::begin`].
    pub(crate) fn rewind(&self) -> io::Result<()> {
        match self.in_place {
            true => self.term.restore_cursor(),
            false => Ok(()),
        }
    }

    pub(crate) fn clear_line(&self) -> io::Result<()> {
        match self.in_place {
            true => self.term.clear_line(),
            false => Ok(()),
        }
    }

    pub(crate) fn write_line(&self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        self.term.flush()
    }
}
