//! Poll-driven in-place rendering of progress indicators.
//!
//! `pollbar` draws one line per [`Indicator`] and redraws the whole block in place
//! on a fixed interval until every indicator has reached its target or the
//! caller cancels. Producers advance indicators from any number of threads; a
//! single renderer (the thread calling [`Poller::show`]) paints them.
//!
//! ```rust,no_run
//! use std::thread;
//! use std::time::Duration;
//! use pollbar::{CancelToken, Indicator, Poller};
//!
//! let poller = Poller::new(Duration::from_millis(50));
//! let bar = poller.add(Indicator::new(100, |state: &pollbar::IndicatorState| {
//!     format!("{}/{}", state.pos, state.target)
//! }));
//!
//! let worker = bar.clone();
//! thread::spawn(move || {
//!     for _ in 0..100 {
//!         worker.advance();
//!         thread::sleep(Duration::from_millis(10));
//!     }
//! });
//!
//! poller.show(&CancelToken::new()).unwrap();
//! ```
//!
//! # Output targets
//!
//! The default target is buffered stdout. When the target is not an attended
//! terminal (for instance when output is redirected to a file) no cursor control
//! sequences are written and every pass is appended as plain lines. See
//! [`DrawTarget`] for the available targets and [`TermLike`] for plugging in
//! custom ones.
#![warn(unreachable_pub)]

mod cancel;
mod draw_target;
mod error;
#[cfg(feature = "in_memory")]
mod in_memory;
mod indicator;
mod poller;
mod style;
mod term_like;

pub use crate::cancel::CancelToken;
pub use crate::draw_target::DrawTarget;
pub use crate::error::{Error, TemplateError};
#[cfg(feature = "in_memory")]
pub use crate::in_memory::InMemoryTerm;
pub use crate::indicator::{Indicator, IndicatorState, Render};
pub use crate::poller::{Poller, MIN_INTERVAL};
pub use crate::style::Template;
pub use crate::term_like::TermLike;
