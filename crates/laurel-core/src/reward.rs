//! Unlock records, reward state and the unlock payload sent to clients

use crate::definition::AchievementDefinition;
use crate::identity::{AchievementId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permanent record that a user satisfied a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    pub user_id: UserId,
    pub achievement_id: AchievementId,
    pub unlocked_at: DateTime<Utc>,
}

/// Accumulated rewards for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRewardState {
    pub user_id: UserId,
    pub total_xp: u64,
    pub currency_balance: u64,
}

/// An achievement unlocked by the current submission
///
/// Embedded in the score-submission response and forwarded to the client's
/// notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub id: AchievementId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: String,
    pub xp_reward: u64,
    #[serde(default)]
    pub is_secret: bool,
}

impl From<&AchievementDefinition> for UnlockedAchievement {
    fn from(def: &AchievementDefinition) -> Self {
        Self {
            id: def.id.clone(),
            title: def.title.clone(),
            description: (!def.description.is_empty()).then(|| def.description.clone()),
            icon: def.icon.clone(),
            xp_reward: def.xp_reward,
            is_secret: def.is_secret,
        }
    }
}
