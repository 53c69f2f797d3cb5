//! Tokio driver for the notification scheduler

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::item::NotificationItem;
use crate::scheduler::{NotificationScheduler, SchedulerEvent, Tick};
use laurel_core::UnlockedAchievement;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Renders scheduler events
pub trait NotificationView: Send + 'static {
    fn render(&mut self, event: &SchedulerEvent);
}

impl NotificationView for mpsc::UnboundedSender<SchedulerEvent> {
    fn render(&mut self, event: &SchedulerEvent) {
        // A view that went away simply stops receiving
        let _ = self.send(event.clone());
    }
}

#[derive(Debug)]
enum Command {
    Enqueue(NotificationItem),
    Dismiss,
    ClearAll,
}

/// Cloneable handle for feeding the running scheduler
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl NotificationSender {
    pub fn enqueue(&self, item: NotificationItem) -> Result<()> {
        self.send(Command::Enqueue(item))
    }

    /// Validate an unlock payload and queue it
    pub fn enqueue_unlock(&self, unlocked: &UnlockedAchievement) -> Result<()> {
        self.enqueue(NotificationItem::from_unlock(unlocked)?)
    }

    pub fn dismiss(&self) -> Result<()> {
        self.send(Command::Dismiss)
    }

    pub fn clear_all(&self) -> Result<()> {
        self.send(Command::ClearAll)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::SchedulerClosed)
    }
}

/// A scheduler running on its own task
///
/// The task owns the scheduler and its single pending sleep. Dropping the
/// service aborts the task, so no timer outlives it.
pub struct NotificationService {
    sender: NotificationSender,
    task: JoinHandle<()>,
}

impl NotificationService {
    /// Spawn the driver. Must be called inside a tokio runtime.
    pub fn spawn(config: SchedulerConfig, view: impl NotificationView) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let origin = Instant::now();
        let task = tokio::spawn(run(NotificationScheduler::new(config), rx, view, origin));
        Self {
            sender: NotificationSender { tx },
            task,
        }
    }

    pub fn sender(&self) -> NotificationSender {
        self.sender.clone()
    }

    pub fn enqueue(&self, item: NotificationItem) -> Result<()> {
        self.sender.enqueue(item)
    }

    pub fn dismiss(&self) -> Result<()> {
        self.sender.dismiss()
    }

    pub fn clear_all(&self) -> Result<()> {
        self.sender.clear_all()
    }
}

impl Drop for NotificationService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn ticks_since(origin: Instant) -> Tick {
    Tick::try_from(origin.elapsed().as_millis()).unwrap_or(Tick::MAX)
}

async fn run(
    mut scheduler: NotificationScheduler,
    mut rx: mpsc::UnboundedReceiver<Command>,
    mut view: impl NotificationView,
    origin: Instant,
) {
    loop {
        // A deadline too far out to represent never wakes the driver
        let wake = scheduler
            .next_deadline()
            .and_then(|deadline| origin.checked_add(Duration::from_millis(deadline)));
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };
                let now = ticks_since(origin);
                // Timers that came due before the command apply first
                scheduler.advance(now);
                match command {
                    Command::Enqueue(item) => scheduler.enqueue(item, now),
                    Command::Dismiss => {
                        scheduler.dismiss(now);
                    }
                    Command::ClearAll => scheduler.clear_all(now),
                }
            }
            _ = sleep_until(wake.unwrap_or(origin)), if wake.is_some() => {
                scheduler.advance(ticks_since(origin));
            }
        }
        for event in scheduler.drain_events() {
            view.render(&event);
        }
    }
    debug!("notification driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::DismissReason;

    fn item(id: &str) -> NotificationItem {
        NotificationItem::new(id, id.to_uppercase(), "★", 10).unwrap()
    }

    fn spawn() -> (NotificationService, mpsc::UnboundedReceiver<SchedulerEvent>) {
        let (view, events) = mpsc::unbounded_channel();
        (NotificationService::spawn(SchedulerConfig::default(), view), events)
    }

    async fn next(events: &mut mpsc::UnboundedReceiver<SchedulerEvent>) -> SchedulerEvent {
        events.recv().await.unwrap()
    }

    fn shown(id: &str, at: Tick) -> SchedulerEvent {
        SchedulerEvent::Shown {
            item: NotificationItem {
                enqueued_at: 0,
                ..item(id)
            },
            at,
        }
    }

    fn dismissed(id: &str, reason: DismissReason, at: Tick) -> SchedulerEvent {
        SchedulerEvent::Dismissed {
            id: id.to_string(),
            reason,
            at,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_display_in_real_time() {
        let (service, mut events) = spawn();
        for id in ["a", "b", "c"] {
            service.enqueue(item(id)).unwrap();
        }

        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(next(&mut events).await);
        }
        assert_eq!(
            seen,
            vec![
                shown("a", 0),
                dismissed("a", DismissReason::Timeout, 5_000),
                shown("b", 5_300),
                dismissed("b", DismissReason::Timeout, 10_300),
                shown("c", 10_600),
                dismissed("c", DismissReason::Timeout, 15_600),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss_then_next() {
        let (service, mut events) = spawn();
        service.enqueue(item("a")).unwrap();
        service.enqueue(item("b")).unwrap();
        assert_eq!(next(&mut events).await, shown("a", 0));

        tokio::time::advance(Duration::from_millis(2_000)).await;
        service.dismiss().unwrap();

        assert_eq!(next(&mut events).await, dismissed("a", DismissReason::Manual, 2_000));
        assert_eq!(next(&mut events).await, shown("b", 2_300));
        // No stale dismissal at 5000; B runs its full duration
        assert_eq!(next(&mut events).await, dismissed("b", DismissReason::Timeout, 7_300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_stops_pending_items() {
        let (service, mut events) = spawn();
        for id in ["a", "b"] {
            service.enqueue(item(id)).unwrap();
        }
        assert_eq!(next(&mut events).await, shown("a", 0));

        service.clear_all().unwrap();
        assert_eq!(next(&mut events).await, SchedulerEvent::Cleared { dropped: 2, at: 0 });

        service.enqueue(item("c")).unwrap();
        assert_eq!(next(&mut events).await, shown("c", 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timers() {
        let (service, mut events) = spawn();
        let sender = service.sender();
        sender.enqueue(item("a")).unwrap();
        assert_eq!(next(&mut events).await, shown("a", 0));

        drop(service);
        // The aborted task drops its view without rendering the dismissal
        assert_eq!(events.recv().await, None);
        assert!(matches!(sender.enqueue(item("b")), Err(Error::SchedulerClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 5;

        let (view, mut events) = mpsc::unbounded_channel();
        let service = NotificationService::spawn(SchedulerConfig::without_grace(1_000), view);
        std::thread::scope(|scope| {
            for p in 0..PRODUCERS {
                let sender = service.sender();
                scope.spawn(move || {
                    for i in 0..PER_PRODUCER {
                        sender.enqueue(item(&format!("p{p}-{i}"))).unwrap();
                    }
                });
            }
        });

        let mut order = Vec::new();
        while order.len() < PRODUCERS * PER_PRODUCER {
            if let SchedulerEvent::Shown { item, .. } = next(&mut events).await {
                order.push(item.id);
            }
        }

        let mut unique = order.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), PRODUCERS * PER_PRODUCER);
        for p in 0..PRODUCERS {
            let prefix = format!("p{p}-");
            let mine: Vec<_> = order.iter().filter(|id| id.starts_with(&prefix)).cloned().collect();
            let expected: Vec<_> = (0..PER_PRODUCER).map(|i| format!("p{p}-{i}")).collect();
            assert_eq!(mine, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_display_duration() {
        let (view, mut events) = mpsc::unbounded_channel();
        let config = SchedulerConfig {
            display_duration_ms: Tick::MAX,
            exit_grace_ms: 300,
        };
        let service = NotificationService::spawn(config, view);
        service.enqueue(item("a")).unwrap();
        assert_eq!(next(&mut events).await, shown("a", 0));

        // Still serving commands; the item only leaves when dismissed
        tokio::time::advance(Duration::from_secs(3_600)).await;
        service.dismiss().unwrap();
        assert_eq!(next(&mut events).await, dismissed("a", DismissReason::Manual, 3_600_000));
    }

    #[tokio::test]
    async fn test_malformed_unlock_rejected() {
        let (service, _events) = spawn();
        let unlocked = UnlockedAchievement {
            id: "x".into(),
            title: "X".into(),
            description: None,
            icon: String::new(),
            xp_reward: 1,
            is_secret: false,
        };
        let result = service.sender().enqueue_unlock(&unlocked);
        assert!(matches!(result, Err(Error::MalformedPayload { field: "icon" })));
    }
}
