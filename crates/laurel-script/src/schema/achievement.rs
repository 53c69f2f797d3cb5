//! Achievement definition schema

use laurel_core::{AchievementDefinition, AchievementId, ConditionKind, GameId};
use serde::{Deserialize, Serialize};

/// An achievement as written in a catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDef {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Icon for notifications; the loader rejects a blank one
    #[serde(default)]
    pub icon: String,
    /// Game this achievement belongs to; global when absent
    #[serde(default)]
    pub game_id: Option<String>,
    /// Condition kind name (e.g. "score_threshold")
    pub condition_type: String,
    /// Condition parameter
    #[serde(default)]
    pub condition_value: f64,
    /// XP granted on unlock
    #[serde(default)]
    pub xp_reward: u64,
    /// Secret achievements grant a currency bonus
    #[serde(default)]
    pub is_secret: bool,
    /// Inactive achievements are never evaluated
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AchievementDef {
    /// Create a new achievement definition
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        condition_type: impl Into<String>,
        condition_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            icon: String::new(),
            game_id: None,
            condition_type: condition_type.into(),
            condition_value,
            xp_reward: 0,
            is_secret: false,
            is_active: true,
        }
    }

    /// Whether a handler exists for the condition type
    pub fn has_handler(&self) -> bool {
        ConditionKind::parse(&self.condition_type).is_some()
    }

    /// Convert into a runtime definition
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

/// A collection of achievement definitions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AchievementDefs {
    pub achievements: Vec<AchievementDef>,
}
