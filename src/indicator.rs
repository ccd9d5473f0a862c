use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use portable_atomic::{AtomicU64, Ordering};

use crate::style::Template;

/// Turns the state of an indicator into the line that is drawn for it.
///
/// A renderer may keep private state between calls (an animation phase, for
/// instance). It is only ever called from the thread running
/// [`Poller::show`](crate::Poller::show) and never concurrently with itself.
///
/// Any `FnMut(&IndicatorState) -> String` closure is a renderer.
pub trait Render: Send {
    fn render(&mut self, state: &IndicatorState) -> io::Result<String>;
}

impl<F> Render for F
where
    F: FnMut(&IndicatorState) -> String + Send,
{
    fn render(&mut self, state: &IndicatorState) -> io::Result<String> {
        Ok(self(state))
    }
}

/// The state of an indicator at a moment in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndicatorState {
    pub pos: u64,
    pub target: u64,
}

impl IndicatorState {
    /// Indicates that the target has been reached.
    pub fn is_finished(&self) -> bool {
        self.pos >= self.target
    }

    /// Returns the completion as a floating-point number between 0 and 1
    pub fn fraction(&self) -> f32 {
        let pct = match (self.pos, self.target) {
            (_, 0) => 1.0,
            (0, _) => 0.0,
            (pos, target) => pos as f32 / target as f32,
        };
        pct.clamp(0.0, 1.0)
    }
}

/// A single progress indicator
///
/// The indicator is an [`Arc`] around its internal state. When the indicator is cloned it
/// just increments the refcount, so a producer thread can keep a clone to advance while
/// a [`Poller`](crate::Poller) holds another to draw.
#[derive(Clone)]
pub struct Indicator {
    inner: Arc<Inner>,
}

struct Inner {
    pos: AtomicU64,
    target: u64,
    renderer: Mutex<Box<dyn Render>>,
}

impl Indicator {
    /// Creates a new indicator with a given target and rendering closure
    pub fn new<F>(target: u64, render: F) -> Indicator
    where
        F: FnMut(&IndicatorState) -> String + Send + 'static,
    {
        Indicator::with_renderer(target, render)
    }

    /// Creates a new indicator drawn by a [`Template`]
    pub fn with_template(target: u64, template: Template) -> Indicator {
        Indicator::with_renderer(target, template)
    }

    /// Creates a new indicator with any [`Render`] implementation
    pub fn with_renderer(target: u64, renderer: impl Render + 'static) -> Indicator {
        Indicator {
            inner: Arc::new(Inner {
                pos: AtomicU64::new(0),
                target,
                renderer: Mutex::new(Box::new(renderer)),
            }),
        }
    }

    /// Advances the position by one
    pub fn advance(&self) {
        self.inc(1);
    }

    /// Advances the position by `delta`, saturating at `u64::MAX`
    pub fn inc(&self, delta: u64) {
        // the closure never returns `None`, so the update cannot fail
        let _ = self
            .inner
            .pos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pos| {
                Some(pos.saturating_add(delta))
            });
    }

    pub fn position(&self) -> u64 {
        self.inner.pos.load(Ordering::Acquire)
    }

    pub fn target(&self) -> u64 {
        self.inner.target
    }

    /// Returns a snapshot of the position and target
    pub fn state(&self) -> IndicatorState {
        IndicatorState {
            pos: self.position(),
            target: self.target(),
        }
    }

    /// Indicates that the position has reached the target
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// Renders the current state to a display line
    pub fn render(&self) -> io::Result<String> {
        self.render_state(&self.state())
    }

    /// Renders a snapshot taken earlier with [`Indicator::state`].
    pub(crate) fn render_state(&self, state: &IndicatorState) -> io::Result<String> {
        // a renderer that panicked keeps whatever state it had
        let mut renderer = self
            .inner
            .renderer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        renderer.render(state)
    }
}

impl fmt::Debug for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indicator")
            .field("pos", &self.position())
            .field("target", &self.target())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn counting(target: u64) -> Indicator {
        Indicator::new(target, |state: &IndicatorState| {
            format!("{}/{}", state.pos, state.target)
        })
    }

    fn hammer(producers: usize, calls: usize) -> u64 {
        let ind = counting(u64::MAX);
        let handles = (0..producers)
            .map(|_| {
                let ind = ind.clone();
                thread::spawn(move || {
                    for _ in 0..calls {
                        ind.advance();
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }
        ind.position()
    }

    #[test]
    fn concurrent_advances_are_not_lost() {
        for (producers, calls) in [(1, 1), (2, 50_000), (8, 5_000), (50, 1000)] {
            assert_eq!(hammer(producers, calls), (producers * calls) as u64);
        }
    }

    #[test]
    fn completion_predicate() {
        let ind = counting(3);
        assert!(!ind.is_finished());
        ind.inc(2);
        assert!(!ind.is_finished());
        ind.advance();
        assert!(ind.is_finished());
        ind.advance();
        assert!(ind.is_finished());
        assert_eq!(ind.position(), 4);
        assert_eq!(ind.target(), 3);
    }

    #[test]
    fn position_saturates_instead_of_wrapping() {
        let ind = counting(u64::MAX);
        ind.advance();
        ind.inc(u64::MAX);
        assert_eq!(ind.position(), u64::MAX);
        ind.advance();
        assert_eq!(ind.position(), u64::MAX);
        assert!(ind.is_finished());
    }

    #[test]
    fn zero_target_is_finished_from_the_start() {
        let ind = counting(0);
        assert!(ind.is_finished());
        assert_eq!(ind.state().fraction(), 1.0);
    }

    #[test]
    fn fraction_is_clamped() {
        let state = IndicatorState { pos: 0, target: 4 };
        assert_eq!(state.fraction(), 0.0);
        let state = IndicatorState { pos: 1, target: 4 };
        assert_eq!(state.fraction(), 0.25);
        let state = IndicatorState { pos: 9, target: 4 };
        assert_eq!(state.fraction(), 1.0);
    }

    #[test]
    fn renderer_keeps_private_state() {
        let mut phase = 0;
        let ind = Indicator::new(10, move |state: &IndicatorState| {
            phase += 1;
            format!("{} #{}", state.pos, phase)
        });

        assert_eq!(ind.render().unwrap(), "0 #1");
        ind.advance();
        assert_eq!(ind.render().unwrap(), "1 #2");
    }

    #[test]
    fn render_failure_is_reported() {
        struct Broken;

        impl Render for Broken {
            fn render(&mut self, _: &IndicatorState) -> io::Result<String> {
                Err(io::Error::new(io::ErrorKind::Other, "broken renderer"))
            }
        }

        let ind = Indicator::with_renderer(1, Broken);
        let err = ind.render().unwrap_err();
        assert_eq!(err.to_string(), "broken renderer");
    }
}
