//! Unlock delivery subscription

use crate::service::NotificationSender;
use laurel_core::UnlockedAchievement;
use std::sync::{Arc, RwLock};
use tracing::{trace, warn};

/// Subscriber callback; returns whether it accepted the unlock
type Callback = Arc<dyn Fn(&UnlockedAchievement) -> bool + Send + Sync>;

/// Holds the single subscriber that receives newly unlocked achievements
///
/// Registering replaces any previous subscriber, so a view that mounts
/// twice never receives each unlock twice.
#[derive(Default)]
pub struct Delivery {
    callback: RwLock<Option<Callback>>,
}

impl Delivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback` as the subscriber, replacing the previous one
    pub fn register(&self, callback: impl Fn(&UnlockedAchievement) -> bool + Send + Sync + 'static) {
        let mut slot = self.callback.write().unwrap_or_else(|e| e.into_inner());
        if slot.replace(Arc::new(callback)).is_some() {
            trace!("replaced unlock subscriber");
        }
    }

    /// Subscribe a running notification scheduler
    ///
    /// Payloads that fail validation are logged and dropped.
    pub fn register_sender(&self, sender: NotificationSender) {
        self.register(move |unlocked| match sender.enqueue_unlock(unlocked) {
            Ok(()) => true,
            Err(err) => {
                warn!(achievement_id = %unlocked.id, error = %err, "dropping unlock notification");
                false
            }
        });
    }

    pub fn unregister(&self) {
        self.callback.write().unwrap_or_else(|e| e.into_inner()).take();
    }

    pub fn is_registered(&self) -> bool {
        self.callback.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Hand each unlock to the subscriber, in order
    ///
    /// Returns how many the subscriber accepted; zero without a subscriber.
    /// The subscriber runs without the registration lock held, so it may
    /// itself register or unregister.
    pub fn deliver(&self, unlocked: &[UnlockedAchievement]) -> usize {
        let callback = self.callback.read().unwrap_or_else(|e| e.into_inner()).clone();
        let Some(callback) = callback else {
            if !unlocked.is_empty() {
                trace!(count = unlocked.len(), "no unlock subscriber");
            }
            return 0;
        };
        unlocked.iter().filter(|&achievement| callback(achievement)).count()
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("registered", &self.is_registered())
            .finish()
    }
}
