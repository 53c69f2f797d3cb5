//! User activity models: events, users and unlocks.

use super::{from_millis, to_millis};
use crate::error::Result;
use laurel_core::{
    AchievementId, EventKind, GameId, GameplayEvent, UnlockRecord, UserId, UserRewardState,
    ValueMap,
};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Stored gameplay event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredEvent {
    /// Primary key - sequence number.
    #[primary_key]
    pub id: u64,
    /// Owning user.
    #[secondary_key]
    pub user_id: String,
    /// Event kind name.
    pub kind: String,
    /// Event value (score for score records).
    pub value: f64,
    /// Game the event happened in.
    pub game_id: Option<String>,
    /// Serialized submission metadata (JSON).
    pub metadata: Vec<u8>,
    /// Unix milliseconds.
    pub recorded_at: i64,
}

impl StoredEvent {
    /// Create from a gameplay event.
    pub fn from_event(id: u64, event: &GameplayEvent) -> Result<Self> {
        let metadata = if event.metadata.is_empty() {
            Vec::new()
        } else {
            serde_json::to_vec(&event.metadata)?
        };
        Ok(Self {
            id,
            user_id: event.user_id.as_str().to_string(),
            kind: event.kind.as_str().to_string(),
            value: event.value,
            game_id: event.game_id.as_ref().map(|g| g.as_str().to_string()),
            metadata,
            recorded_at: to_millis(&event.timestamp),
        })
    }

    /// Convert to a gameplay event.
    ///
    /// Rows with a kind this build does not know are skipped by callers.
    pub fn to_event(&self) -> Option<GameplayEvent> {
        let kind = EventKind::parse(&self.kind)?;
        let metadata: ValueMap = if self.metadata.is_empty() {
            ValueMap::new()
        } else {
            serde_json::from_slice(&self.metadata).unwrap_or_else(|err| {
                warn!(event_id = self.id, error = %err, "discarding unreadable event metadata");
                ValueMap::new()
            })
        };
        Some(
            GameplayEvent::new(
                UserId::new(self.user_id.clone()),
                kind,
                self.value,
                self.game_id.clone().map(GameId::new),
                from_millis(self.recorded_at),
            )
            .with_metadata(metadata),
        )
    }

    /// Whether this row has the given kind.
    pub fn is_kind(&self, kind: EventKind) -> bool {
        self.kind == kind.as_str()
    }
}

/// Monotonic counter row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredSequence {
    /// Counter name.
    #[primary_key]
    pub name: String,
    /// Next value to hand out.
    pub next: u64,
}

/// Stored user with accumulated rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredUser {
    /// Primary key - user ID.
    #[primary_key]
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Total XP earned.
    pub total_xp: u64,
    /// Currency balance.
    pub currency_balance: u64,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl StoredUser {
    /// Convert to reward state.
    pub fn to_reward_state(&self) -> UserRewardState {
        UserRewardState {
            user_id: UserId::new(self.id.clone()),
            total_xp: self.total_xp,
            currency_balance: self.currency_balance,
        }
    }
}

/// Stored unlock record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct StoredUnlock {
    /// Primary key - `user_id` and `achievement_id` joined by a unit separator.
    #[primary_key]
    pub key: String,
    /// Owning user.
    #[secondary_key]
    pub user_id: String,
    /// Unlocked achievement.
    pub achievement_id: String,
    /// Unix milliseconds.
    pub unlocked_at: i64,
}

impl StoredUnlock {
    /// Primary key for a (user, achievement) pair.
    pub fn key_for(user_id: &UserId, achievement_id: &AchievementId) -> String {
        format!("{}\u{1f}{}", user_id.as_str(), achievement_id.as_str())
    }

    /// Create from an unlock record.
    pub fn from_record(record: &UnlockRecord) -> Self {
        Self {
            key: Self::key_for(&record.user_id, &record.achievement_id),
            user_id: record.user_id.as_str().to_string(),
            achievement_id: record.achievement_id.as_str().to_string(),
            unlocked_at: to_millis(&record.unlocked_at),
        }
    }

    /// Convert to an unlock record.
    pub fn to_record(&self) -> UnlockRecord {
        UnlockRecord {
            user_id: UserId::new(self.user_id.clone()),
            achievement_id: AchievementId::new(self.achievement_id.clone()),
            unlocked_at: from_millis(self.unlocked_at),
        }
    }
}
