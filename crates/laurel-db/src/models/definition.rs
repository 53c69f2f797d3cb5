//! Definition models for database storage.

use laurel_core::{AchievementDefinition, AchievementId, GameId};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored achievement definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 10, version = 1)]
#[native_db]
pub struct StoredDefinition {
    /// Primary key - achievement ID.
    #[primary_key]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Description.
    pub description: String,
    /// XP granted on unlock.
    pub xp_reward: u64,
    /// Game scope, `None` for global achievements.
    pub game_id: Option<String>,
    /// Icon shown in notifications.
    pub icon: String,
    /// Condition kind name.
    pub condition_type: String,
    /// Condition parameter.
    pub condition_value: f64,
    /// Whether secret.
    pub is_secret: bool,
    /// Whether active.
    pub is_active: bool,
}

impl StoredDefinition {
    /// Create from a definition.
    pub fn from_definition(def: &AchievementDefinition) -> Self {
        Self {
            id: def.id.as_str().to_string(),
            title: def.title.clone(),
            description: def.description.clone(),
            xp_reward: def.xp_reward,
            game_id: def.game_id.as_ref().map(|g| g.as_str().to_string()),
            icon: def.icon.clone(),
            condition_type: def.condition_type.clone(),
            condition_value: def.condition_value,
            is_secret: def.is_secret,
            is_active: def.is_active,
        }
    }

    /// Convert to a definition.
    pub fn to_definition(&self) -> AchievementDefinition {
        AchievementDefinition {
            id: AchievementId::new(self.id.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            game_id: self.game_id.clone().map(GameId::new),
            condition_type: self.condition_type.clone(),
            condition_value: self.condition_value,
            xp_reward: self.xp_reward,
            is_secret: self.is_secret,
            is_active: self.is_active,
        }
    }
}
