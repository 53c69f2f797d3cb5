//! Sequential notification scheduling
//!
//! [`NotificationScheduler`] is a pure state machine over logical time: it
//! never sleeps and never reads a clock. Callers pass the current [`Tick`]
//! to every operation and ask [`next_deadline`](NotificationScheduler::next_deadline)
//! when to wake it up next. The scheduler owns at most one timer; arming a
//! new one invalidates the previous [`TimerId`], so a fire that arrives late
//! for a notification that is already gone is ignored.
//!
//! ```text
//! Idle --enqueue--> Showing(item) --timeout/dismiss--> Leaving(item)
//!   ^                                                     |
//!   +---------- queue empty <-- grace elapsed ------------+
//!                                     \--> Showing(next)
//! ```

use crate::config::SchedulerConfig;
use crate::item::NotificationItem;
use std::collections::VecDeque;
use tracing::debug;

/// Logical time in milliseconds
pub type Tick = u64;

/// Handle of an armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPurpose {
    AutoDismiss,
    ExitComplete,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    due: Tick,
    purpose: TimerPurpose,
}

/// What the display is doing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// An item is on screen
    Showing(NotificationItem),
    /// The item was dismissed and is animating out
    Leaving(NotificationItem),
}

/// Why an item left the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Timeout,
    Manual,
}

/// Changes the view has to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    Shown { item: NotificationItem, at: Tick },
    Dismissed { id: String, reason: DismissReason, at: Tick },
    /// Everything was dropped; `dropped` counts the current item and the queue
    Cleared { dropped: usize, at: Tick },
}

/// FIFO queue of notifications shown one at a time
#[derive(Debug, Default)]
pub struct NotificationScheduler {
    config: SchedulerConfig,
    queue: VecDeque<NotificationItem>,
    phase: Phase,
    timer: Option<Timer>,
    next_timer: u64,
    events: Vec<SchedulerEvent>,
}

impl NotificationScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The item on screen, if any
    pub fn current(&self) -> Option<&NotificationItem> {
        match &self.phase {
            Phase::Showing(item) => Some(item),
            _ => None,
        }
    }

    /// Items waiting behind the current one, in display order
    pub fn pending(&self) -> impl Iterator<Item = &NotificationItem> {
        self.queue.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// When the armed timer is due
    pub fn next_deadline(&self) -> Option<Tick> {
        self.timer.map(|t| t.due)
    }

    /// The currently valid timer handle
    pub fn armed_timer(&self) -> Option<TimerId> {
        self.timer.map(|t| t.id)
    }

    /// Queue an item; shows it immediately when the display is idle
    pub fn enqueue(&mut self, mut item: NotificationItem, now: Tick) {
        item.enqueued_at = now;
        debug!(id = %item.id, at = now, queued = self.queue.len(), "notification enqueued");
        self.queue.push_back(item);
        if self.phase == Phase::Idle {
            self.show_next(now);
        }
    }

    /// Dismiss the item on screen. Returns false when nothing is showing.
    pub fn dismiss(&mut self, now: Tick) -> bool {
        if !matches!(self.phase, Phase::Showing(_)) {
            return false;
        }
        let Phase::Showing(item) = std::mem::take(&mut self.phase) else {
            return false;
        };
        self.timer = None;
        self.events.push(SchedulerEvent::Dismissed {
            id: item.id.clone(),
            reason: DismissReason::Manual,
            at: now,
        });
        self.begin_exit(item, now);
        true
    }

    /// Deliver a timer expiry. Stale handles are ignored and return false.
    pub fn fire(&mut self, timer_id: TimerId, now: Tick) -> bool {
        let timer = match self.timer {
            Some(timer) if timer.id == timer_id => timer,
            _ => {
                debug!(?timer_id, at = now, "ignoring stale timer");
                return false;
            }
        };
        self.timer = None;
        match (timer.purpose, std::mem::take(&mut self.phase)) {
            (TimerPurpose::AutoDismiss, Phase::Showing(item)) => {
                self.events.push(SchedulerEvent::Dismissed {
                    id: item.id.clone(),
                    reason: DismissReason::Timeout,
                    at: now,
                });
                self.begin_exit(item, now);
            }
            (TimerPurpose::ExitComplete, Phase::Leaving(_)) => self.show_next(now),
            (_, phase) => self.phase = phase,
        }
        true
    }

    /// Fire every timer due at or before `now`, each at its own due tick
    pub fn advance(&mut self, now: Tick) {
        while let Some(timer) = self.timer.filter(|t| t.due <= now) {
            self.fire(timer.id, timer.due);
        }
    }

    /// Drop the current item and the queue, and cancel the timer
    pub fn clear_all(&mut self, now: Tick) {
        let on_screen = usize::from(self.phase != Phase::Idle);
        let dropped = self.queue.len() + on_screen;
        self.queue.clear();
        self.timer = None;
        self.phase = Phase::Idle;
        debug!(dropped, at = now, "notifications cleared");
        self.events.push(SchedulerEvent::Cleared { dropped, at: now });
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut self.events)
    }

    fn begin_exit(&mut self, item: NotificationItem, now: Tick) {
        if self.config.exit_grace_ms == 0 {
            self.show_next(now);
        } else {
            self.phase = Phase::Leaving(item);
            self.arm(now, self.config.exit_grace_ms, TimerPurpose::ExitComplete);
        }
    }

    fn show_next(&mut self, now: Tick) {
        match self.queue.pop_front() {
            Some(item) => {
                debug!(id = %item.id, at = now, "showing notification");
                self.phase = Phase::Showing(item.clone());
                self.arm(now, self.config.display_duration_ms, TimerPurpose::AutoDismiss);
                self.events.push(SchedulerEvent::Shown { item, at: now });
            }
            None => self.phase = Phase::Idle,
        }
    }

    /// Replace the timer; a due tick past the end of time pins to `Tick::MAX`
    fn arm(&mut self, now: Tick, delay: Tick, purpose: TimerPurpose) {
        self.next_timer += 1;
        self.timer = Some(Timer {
            id: TimerId(self.next_timer),
            due: now.saturating_add(delay),
            purpose,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> NotificationItem {
        NotificationItem::new(id, id.to_uppercase(), "★", 10).unwrap()
    }

    fn shown(events: &[SchedulerEvent]) -> Vec<(String, Tick)> {
        events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Shown { item, at } => Some((item.id.clone(), *at)),
                _ => None,
            })
            .collect()
    }

    fn current_id(scheduler: &NotificationScheduler) -> Option<&str> {
        scheduler.current().map(|i| i.id.as_str())
    }

    #[test]
    fn test_enqueue_when_idle_shows_immediately() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        s.enqueue(item("a"), 40);

        assert_eq!(current_id(&s), Some("a"));
        assert_eq!(s.current().unwrap().enqueued_at, 40);
        assert_eq!(s.next_deadline(), Some(5_040));
        assert_eq!(shown(&s.drain_events()), vec![("a".to_string(), 40)]);
    }

    #[test]
    fn test_fifo_order_one_at_a_time() {
        let mut s = NotificationScheduler::new(SchedulerConfig::without_grace(5_000));
        for id in ["a", "b", "c"] {
            s.enqueue(item(id), 0);
        }
        assert_eq!(current_id(&s), Some("a"));
        assert_eq!(s.pending().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);

        s.advance(20_000);
        assert!(s.is_idle());
        assert_eq!(
            shown(&s.drain_events()),
            vec![("a".to_string(), 0), ("b".to_string(), 5_000), ("c".to_string(), 10_000)]
        );
    }

    #[test]
    fn test_auto_dismiss_exactly_at_duration() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        s.enqueue(item("a"), 0);

        s.advance(4_999);
        assert_eq!(current_id(&s), Some("a"));

        s.advance(5_000);
        assert_eq!(s.current(), None);
        let events = s.drain_events();
        assert!(events.contains(&SchedulerEvent::Dismissed {
            id: "a".into(),
            reason: DismissReason::Timeout,
            at: 5_000,
        }));
    }

    #[test]
    fn test_three_items_with_exit_grace() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        for id in ["a", "b", "c"] {
            s.enqueue(item(id), 0);
        }
        s.advance(5_299);
        assert!(matches!(s.phase(), Phase::Leaving(i) if i.id == "a"));

        s.advance(30_000);
        assert_eq!(
            shown(&s.drain_events()),
            vec![("a".to_string(), 0), ("b".to_string(), 5_300), ("c".to_string(), 10_600)]
        );
        assert!(s.is_idle());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_manual_dismiss_cancels_auto_dismiss() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        s.enqueue(item("a"), 0);
        s.enqueue(item("b"), 0);
        let stale = s.armed_timer().unwrap();

        assert!(s.dismiss(2_000));
        s.advance(2_300);
        assert_eq!(current_id(&s), Some("b"));

        // The original 5000 ms timer must not dismiss B
        assert!(!s.fire(stale, 5_000));
        s.advance(5_000);
        assert_eq!(current_id(&s), Some("b"));

        s.advance(7_300);
        assert_eq!(s.current(), None);

        let dismissals: Vec<_> = s
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SchedulerEvent::Dismissed { id, reason, at } => Some((id, reason, at)),
                _ => None,
            })
            .collect();
        assert_eq!(
            dismissals,
            vec![
                ("a".to_string(), DismissReason::Manual, 2_000),
                ("b".to_string(), DismissReason::Timeout, 7_300),
            ]
        );
    }

    #[test]
    fn test_dismiss_when_nothing_showing() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        assert!(!s.dismiss(0));

        s.enqueue(item("a"), 0);
        assert!(s.dismiss(100));
        // Leaving: a second dismiss has nothing to act on
        assert!(!s.dismiss(150));
        assert!(matches!(s.phase(), Phase::Leaving(_)));
    }

    #[test]
    fn test_enqueue_during_exit_waits_for_grace() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        s.enqueue(item("a"), 0);
        s.dismiss(1_000);
        s.enqueue(item("b"), 1_100);
        assert_eq!(s.current(), None);

        s.advance(1_300);
        assert_eq!(current_id(&s), Some("b"));
        assert_eq!(s.next_deadline(), Some(6_300));
    }

    #[test]
    fn test_huge_durations_saturate() {
        let mut s = NotificationScheduler::new(SchedulerConfig {
            display_duration_ms: Tick::MAX,
            exit_grace_ms: Tick::MAX,
        });
        s.enqueue(item("a"), 10);
        s.enqueue(item("b"), 10);
        assert_eq!(s.next_deadline(), Some(Tick::MAX));

        s.advance(Tick::MAX - 1);
        assert_eq!(current_id(&s), Some("a"));
        assert!(s.dismiss(20));
        assert_eq!(s.next_deadline(), Some(Tick::MAX));
    }

    #[test]
    fn test_clear_all_cancels_everything() {
        let mut s = NotificationScheduler::new(SchedulerConfig::default());
        for id in ["a", "b", "c"] {
            s.enqueue(item(id), 0);
        }
        let stale = s.armed_timer().unwrap();
        s.drain_events();

        s.clear_all(1_000);
        assert!(s.is_idle());
        assert_eq!(s.pending_len(), 0);
        assert_eq!(s.next_deadline(), None);
        assert!(!s.fire(stale, 5_000));
        assert_eq!(s.drain_events(), vec![SchedulerEvent::Cleared { dropped: 3, at: 1_000 }]);

        // Usable again afterwards
        s.enqueue(item("d"), 2_000);
        assert_eq!(current_id(&s), Some("d"));
    }
}
