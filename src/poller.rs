use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::cancel::CancelToken;
use crate::draw_target::DrawTarget;
use crate::error::Error;
use crate::indicator::Indicator;

/// The shortest redraw interval a poller accepts.
///
/// Shorter intervals are raised to this value so the renderer cannot keep the
/// registry locked against producers adding indicators.
pub const MIN_INTERVAL: Duration = Duration::from_millis(3);

/// Draws a set of indicators in place until all of them are finished
///
/// The poller is an [`Arc`] around its registry, so clones share it: one thread
/// can block in [`Poller::show`] while others add indicators or change the
/// interval.
#[derive(Debug, Clone)]
pub struct Poller {
    state: Arc<RwLock<PollerState>>,
}

impl Poller {
    /// Creates a poller that redraws to stdout every `interval`.
    pub fn new(interval: Duration) -> Poller {
        Poller::with_draw_target(interval, DrawTarget::stdout())
    }

    /// Creates a poller with the given draw target.
    pub fn with_draw_target(interval: Duration, draw_target: DrawTarget) -> Poller {
        Poller {
            state: Arc::new(RwLock::new(PollerState {
                indicators: vec![],
                interval: clamp_interval(interval),
                draw_target,
                running: false,
            })),
        }
    }

    /// Adds an indicator to the end of the display order.
    ///
    /// This may be called while [`Poller::show`] is running; the indicator is
    /// drawn from the next pass on.
    pub fn add(&self, indicator: Indicator) -> Indicator {
        self.state().indicators.push(indicator.clone());
        indicator
    }

    /// Adds any number of indicators, in order, to the end of the display order.
    pub fn extend<I>(&self, indicators: I) -> &Poller
    where
        I: IntoIterator<Item = Indicator>,
    {
        let mut indicators = indicators.into_iter().peekable();
        if indicators.peek().is_none() {
            return self;
        }

        self.state().indicators.extend(indicators);
        self
    }

    /// Sets the time between redraws.
    ///
    /// A running poller picks the new interval up for its next wait; a wait
    /// already in progress is not cut short.
    pub fn set_interval(&self, interval: Duration) {
        self.state().interval = clamp_interval(interval);
    }

    pub fn interval(&self) -> Duration {
        self.read_state().interval
    }

    /// Sets a different draw target.
    ///
    /// Fails with [`Error::Running`] while [`Poller::show`] is running, leaving
    /// the current target in place.
    pub fn set_draw_target(&self, draw_target: DrawTarget) -> Result<(), Error> {
        let mut state = self.state();
        if state.running {
            return Err(Error::Running);
        }

        state.draw_target = draw_target;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.read_state().running
    }

    /// Returns the number of registered indicators.
    pub fn len(&self) -> usize {
        self.read_state().indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Redraws all indicators every interval until they are all finished.
    ///
    /// Blocks the calling thread. Returns `Ok(())` once every indicator has
    /// reached its target, [`Error::Canceled`] if `cancel` fires first, and
    /// [`Error::Io`] as soon as drawing or rendering fails. A poller without
    /// indicators finishes on its first pass.
    ///
    /// Cancellation is only observed between passes. Calling this while
    /// another call is still running returns [`Error::Running`].
    pub fn show(&self, cancel: &CancelToken) -> Result<(), Error> {
        {
            let mut state = self.state();
            if state.running {
                return Err(Error::Running);
            }
            state.running = true;
        }
        let _running = RunningGuard { poller: self };

        let result = self.run(cancel);
        match &result {
            Ok(()) => debug!("all indicators finished"),
            Err(Error::Canceled) => debug!("progress display canceled"),
            Err(err) => debug!("progress display failed: {err}"),
        }
        result
    }

    fn run(&self, cancel: &CancelToken) -> Result<(), Error> {
        {
            let state = self.state();
            debug!(
                "showing {} indicators every {:?}",
                state.indicators.len(),
                state.interval
            );
            if let Some(drawable) = state.draw_target.drawable() {
                drawable.begin()?;
            }
        }

        loop {
            // read fresh every cycle so set_interval applies to the next wait
            let interval = self.interval();
            if cancel.wait_timeout(interval) {
                return Err(Error::Canceled);
            }

            if self.poll()? {
                return Ok(());
            }
        }
    }

    /// Draws one pass and returns true if every indicator is finished.
    pub(crate) fn poll(&self) -> Result<bool, Error> {
        let state = self.state();
        let mut finished = 0;

        match state.draw_target.drawable() {
            Some(drawable) => {
                drawable.rewind()?;
                for indicator in &state.indicators {
                    let snapshot = indicator.state();
                    drawable.clear_line()?;
                    let line = indicator.render_state(&snapshot)?;
                    drawable.write_line(&line)?;
                    finished += usize::from(snapshot.is_finished());
                }
                drawable.flush()?;
            }
            None => {
                finished = state
                    .indicators
                    .iter()
                    .filter(|indicator| indicator.is_finished())
                    .count();
            }
        }

        trace!("drew pass: {finished}/{} finished", state.indicators.len());
        Ok(finished == state.indicators.len())
    }

    /// The registry lock. Both registry changes and passes take it exclusively.
    fn state(&self) -> RwLockWriteGuard<'_, PollerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PollerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct PollerState {
    /// Indicators in display order
    indicators: Vec<Indicator>,
    interval: Duration,
    draw_target: DrawTarget,
    /// True while a `show` call is active
    running: bool,
}

/// Clears the running flag however `show` exits.
struct RunningGuard<'a> {
    poller: &'a Poller,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.poller.state().running = false;
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    if interval < MIN_INTERVAL {
        warn!("redraw interval {interval:?} is below {MIN_INTERVAL:?}, using {MIN_INTERVAL:?}");
        return MIN_INTERVAL;
    }
    interval
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{IndicatorState, TermLike};

    #[derive(Debug, Clone, Default)]
    struct Recorder {
        out: Arc<Mutex<String>>,
    }

    impl Recorder {
        fn take(&self) -> String {
            std::mem::take(&mut *self.out.lock().unwrap())
        }
    }

    impl TermLike for Recorder {
        fn write_line(&self, s: &str) -> io::Result<()> {
            let mut out = self.out.lock().unwrap();
            out.push_str(s);
            out.push('\n');
            Ok(())
        }

        fn write_str(&self, s: &str) -> io::Result<()> {
            self.out.lock().unwrap().push_str(s);
            Ok(())
        }

        fn flush(&self) -> io::Result<()> {
            Ok(())
        }
    }

    fn recorded(interval: Duration) -> (Poller, Recorder) {
        let rec = Recorder::default();
        let target = DrawTarget::term_like(Box::new(rec.clone()));
        let poller = Poller::with_draw_target(interval, target);
        (poller, rec)
    }

    fn labeled(label: &'static str, target: u64) -> Indicator {
        Indicator::new(target, move |state: &IndicatorState| {
            format!("{label} {}/{}", state.pos, state.target)
        })
    }

    #[test]
    fn redraw_of_unchanged_state_is_identical() {
        let (poller, rec) = recorded(Duration::from_millis(10));
        let a = poller.add(labeled("a", 5));
        poller.add(labeled("b", 5));
        a.inc(2);

        assert!(!poller.poll().unwrap());
        let first = rec.take();
        assert!(!poller.poll().unwrap());
        let second = rec.take();

        assert_eq!(first, "\x1b8\r\x1b[2Ka 2/5\n\r\x1b[2Kb 0/5\n");
        assert_eq!(first, second);
    }

    #[test]
    fn pass_reports_completion() {
        let (poller, _rec) = recorded(Duration::from_millis(10));
        let a = poller.add(labeled("a", 1));
        let b = poller.add(labeled("b", 2));

        assert!(!poller.poll().unwrap());
        a.advance();
        assert!(!poller.poll().unwrap());
        b.inc(2);
        assert!(poller.poll().unwrap());
    }

    #[test]
    fn empty_pass_is_finished() {
        let (poller, rec) = recorded(Duration::from_millis(10));
        assert!(poller.is_empty());
        assert!(poller.poll().unwrap());
        assert!(!rec.take().contains('\n'));
    }

    #[test]
    fn extend_keeps_order_and_ignores_empty() {
        let (poller, rec) = recorded(Duration::from_millis(10));
        poller.extend(Vec::new());
        assert_eq!(poller.len(), 0);

        poller
            .extend([labeled("x", 1), labeled("y", 1)])
            .extend(Some(labeled("z", 1)));
        assert_eq!(poller.len(), 3);

        poller.poll().unwrap();
        let out = rec.take();
        let x = out.find("x 0/1").unwrap();
        let y = out.find("y 0/1").unwrap();
        let z = out.find("z 0/1").unwrap();
        assert!(x < y && y < z);
    }

    #[test]
    fn interval_is_clamped() {
        let (poller, _rec) = recorded(Duration::ZERO);
        assert_eq!(poller.interval(), MIN_INTERVAL);

        poller.set_interval(Duration::from_millis(250));
        assert_eq!(poller.interval(), Duration::from_millis(250));
        poller.set_interval(Duration::from_micros(10));
        assert_eq!(poller.interval(), MIN_INTERVAL);
    }

    #[test]
    fn hidden_target_still_tracks_completion() {
        let poller = Poller::with_draw_target(Duration::from_millis(5), DrawTarget::hidden());
        let a = poller.add(labeled("a", 1));
        assert!(!poller.poll().unwrap());
        a.advance();
        assert!(poller.poll().unwrap());
    }

    #[test]
    fn running_flag_is_cleared_after_show() {
        let (poller, _rec) = recorded(Duration::from_millis(5));
        poller.show(&CancelToken::new()).unwrap();
        assert!(!poller.is_running());

        let cancel = CancelToken::new();
        cancel.cancel();
        poller.add(labeled("a", 1));
        assert!(poller.show(&cancel).unwrap_err().is_canceled());
        assert!(!poller.is_running());
    }
}
