//! Leading-edge debouncing
//!
//! A single physical tap often arrives as several input events (touch start,
//! mouse down, click). [`Debouncer::trigger`] lets the first one through and
//! swallows the rest until the input has been quiet for the full window.

use std::time::Duration;
use tokio::time::Instant;

/// Window used by the proceed, select and stop controls
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Leading-edge debouncer
///
/// Every trigger, accepted or not, restarts the quiet window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    #[inline]
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    /// Register a trigger now; `true` if the action should run
    pub fn trigger(&mut self) -> bool {
        self.trigger_at(Instant::now())
    }

    /// Register a trigger at an explicit instant
    pub fn trigger_at(&mut self, now: Instant) -> bool {
        let fire = match self.last_trigger {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        };
        self.last_trigger = Some(now);
        fire
    }

    /// Forget previous triggers
    pub fn reset(&mut self) {
        self.last_trigger = None;
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_trigger_fires() {
        let mut d = Debouncer::default();
        assert!(d.trigger_at(Instant::now()));
    }

    #[test]
    fn duplicate_within_window_is_swallowed() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        assert!(d.trigger_at(start));
        assert!(!d.trigger_at(start + Duration::from_millis(100)));
    }

    #[test]
    fn quiet_window_restarts_on_swallowed_trigger() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        assert!(d.trigger_at(start));
        assert!(!d.trigger_at(start + Duration::from_millis(400)));
        // 600ms after the first but only 200ms after the swallowed one
        assert!(!d.trigger_at(start + Duration::from_millis(600)));
        assert!(d.trigger_at(start + Duration::from_millis(1100)));
    }

    #[test]
    fn reset_allows_immediate_fire() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        assert!(d.trigger_at(start));
        d.reset();
        assert!(d.trigger_at(start));
    }

    #[tokio::test(start_paused = true)]
    async fn uses_runtime_clock() {
        let mut d = Debouncer::new(Duration::from_millis(500));
        assert!(d.trigger());
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!d.trigger());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(d.trigger());
    }

    proptest! {
        #[test]
        fn burst_inside_window_fires_once(gaps in prop::collection::vec(0u64..100, 1..20)) {
            let start = Instant::now();
            let mut d = Debouncer::new(Duration::from_millis(500));
            let mut at = start;
            let mut fired = usize::from(d.trigger_at(at));
            for gap in gaps {
                at += Duration::from_millis(gap);
                fired += usize::from(d.trigger_at(at));
            }
            prop_assert_eq!(fired, 1);
        }

        #[test]
        fn spaced_triggers_all_fire(count in 1usize..20, extra in 0u64..1000) {
            let start = Instant::now();
            let mut d = Debouncer::new(Duration::from_millis(500));
            let step = Duration::from_millis(500 + extra);
            let fired = (0..count)
                .filter(|i| d.trigger_at(start + step * u32::try_from(*i).unwrap()))
                .count();
            prop_assert_eq!(fired, count);
        }
    }
}
