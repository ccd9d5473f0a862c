use std::io;

use thiserror::Error;

/// Errors reported by a [`Poller`](crate::Poller).
#[derive(Error, Debug)]
pub enum Error {
    /// The operation is not permitted while the redraw loop is active.
    #[error("operation not permitted while the poller is running")]
    Running,

    /// The session ended because its [`CancelToken`](crate::CancelToken) fired.
    #[error("canceled")]
    Canceled,

    /// Writing to the draw target or rendering an indicator failed.
    #[error("failed to draw progress: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if this is the cancellation outcome rather than a failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }
}

/// Errors from parsing a [`Template`](crate::Template).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template key `{0}`")]
    UnknownKey(String),

    #[error("invalid width `{width}` for template key `{key}`")]
    InvalidWidth { key: String, width: String },

    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}
