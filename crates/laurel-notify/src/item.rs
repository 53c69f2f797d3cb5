//! Notification items

use crate::error::{Error, Result};
use crate::scheduler::Tick;
use laurel_core::UnlockedAchievement;

/// One notification waiting for, or occupying, the display
///
/// Only constructed through validation, so every item the scheduler holds
/// has the fields the view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub xp_reward: u64,
    pub description: Option<String>,
    /// Stamped by the scheduler on enqueue
    pub enqueued_at: Tick,
}

impl NotificationItem {
    /// Build an item, rejecting payloads without display fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        icon: impl Into<String>,
        xp_reward: u64,
    ) -> Result<Self> {
        let item = Self {
            id: id.into(),
            title: title.into(),
            icon: icon.into(),
            xp_reward,
            description: None,
            enqueued_at: 0,
        };
        item.validate()?;
        Ok(item)
    }

    /// Build an item from an unlock payload
    pub fn from_unlock(unlocked: &UnlockedAchievement) -> Result<Self> {
        let item = Self::new(
            unlocked.id.as_str(),
            unlocked.title.as_str(),
            unlocked.icon.as_str(),
            unlocked.xp_reward,
        )?;
        Ok(item.with_description(unlocked.description.clone().unwrap_or_default()))
    }

    /// Attach a description; blank descriptions are dropped
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [("id", &self.id), ("title", &self.title), ("icon", &self.icon)] {
            if value.trim().is_empty() {
                return Err(Error::MalformedPayload { field });
            }
        }
        Ok(())
    }
}
