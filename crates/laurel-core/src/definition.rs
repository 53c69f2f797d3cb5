//! Achievement definitions and condition kinds

use crate::error::Error;
use crate::identity::{AchievementId, GameId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of rule families an achievement can be unlocked by
///
/// Catalogs store the kind as a snake_case string; strings that do not map
/// to a variant have no handler and are skipped by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Submitted score reaches the threshold
    ScoreThreshold,
    /// Number of games played across all games
    TotalEventCount,
    /// Number of positive-score runs for one game
    CompletionCount,
    /// The user has an account (first login)
    AccountExists,
    /// Coin flip per evaluation
    StreakProbabilistic,
    /// Number of achievements already unlocked
    UnlockCount,
    /// Reported completion time is at most the value
    TimeUnder,
    /// Reported speed is at least the value
    SpeedOver,
    /// Always satisfied once its trigger is reported
    SecretAlwaysTrue,
    /// Fixed-probability roll per evaluation
    RandomChance,
    /// The user has played at night at least once
    NightFlagPresent,
}

impl ConditionKind {
    /// Every kind, in catalog order
    pub const ALL: [ConditionKind; 11] = [
        ConditionKind::ScoreThreshold,
        ConditionKind::TotalEventCount,
        ConditionKind::CompletionCount,
        ConditionKind::AccountExists,
        ConditionKind::StreakProbabilistic,
        ConditionKind::UnlockCount,
        ConditionKind::TimeUnder,
        ConditionKind::SpeedOver,
        ConditionKind::SecretAlwaysTrue,
        ConditionKind::RandomChance,
        ConditionKind::NightFlagPresent,
    ];

    /// Catalog name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::ScoreThreshold => "score_threshold",
            ConditionKind::TotalEventCount => "total_games",
            ConditionKind::CompletionCount => "game_completions",
            ConditionKind::AccountExists => "first_login",
            ConditionKind::StreakProbabilistic => "streak",
            ConditionKind::UnlockCount => "achievement_count",
            ConditionKind::TimeUnder => "time_under",
            ConditionKind::SpeedOver => "speed_over",
            ConditionKind::SecretAlwaysTrue => "secret",
            ConditionKind::RandomChance => "random_chance",
            ConditionKind::NightFlagPresent => "night_owl",
        }
    }

    /// Look up a kind by its catalog name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidDefinition(format!("unknown condition type: {s}")))
    }
}

/// Which submissions a definition is a candidate for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Evaluated on every game's submissions
    Global,
    /// Evaluated only on submissions for one game
    Game(GameId),
}

/// A rule describing what triggers an unlock and what it grants
///
/// Definitions are immutable once seeded. `condition_type` is kept as the
/// stored string so definitions written for newer handlers survive a round
/// trip through older binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// `None` for global achievements
    #[serde(default)]
    pub game_id: Option<GameId>,
    pub condition_type: String,
    #[serde(default)]
    pub condition_value: f64,
    #[serde(default)]
    pub xp_reward: u64,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AchievementDefinition {
    /// Create an active, non-secret definition
    pub fn new(
        id: impl Into<AchievementId>,
        title: impl Into<String>,
        kind: ConditionKind,
        condition_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            icon: String::new(),
            game_id: None,
            condition_type: kind.as_str().to_string(),
            condition_value,
            xp_reward: 0,
            is_secret: false,
            is_active: true,
        }
    }

    /// Restrict this definition to one game
    pub fn for_game(mut self, game_id: impl Into<GameId>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }

    /// Set the XP reward
    pub fn with_xp(mut self, xp_reward: u64) -> Self {
        self.xp_reward = xp_reward;
        self
    }

    /// Set the icon shown in notifications
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Mark as secret (grants the currency bonus on unlock)
    pub fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }

    /// Mark as inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The handled condition kind, or `None` if no handler exists
    pub fn condition_kind(&self) -> Option<ConditionKind> {
        ConditionKind::parse(&self.condition_type)
    }

    /// Scope derived from `game_id`
    pub fn scope(&self) -> Scope {
        match &self.game_id {
            Some(game) => Scope::Game(game.clone()),
            None => Scope::Global,
        }
    }

    /// Whether this definition is a candidate for a submission on `game_id`
    pub fn applies_to(&self, game_id: Option<&GameId>) -> bool {
        match (&self.game_id, game_id) {
            (None, _) => true,
            (Some(own), Some(game)) => own == game,
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_kind_names_round_trip() {
        for kind in ConditionKind::ALL {
            assert_eq!(ConditionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ConditionKind::parse("daily_login"), None);
        assert!("daily_login".parse::<ConditionKind>().is_err());
    }

    #[test]
    fn test_unknown_condition_has_no_kind() {
        let mut def = AchievementDefinition::new("x", "X", ConditionKind::ScoreThreshold, 1.0);
        def.condition_type = "combo_chain".to_string();
        assert_eq!(def.condition_kind(), None);
    }

    #[test]
    fn test_scope_matching() {
        let global = AchievementDefinition::new("g", "G", ConditionKind::AccountExists, 0.0);
        let snake = global.clone().for_game("snake");

        assert_eq!(global.scope(), Scope::Global);
        assert_eq!(snake.scope(), Scope::Game(GameId::new("snake")));

        let snake_id = GameId::new("snake");
        let memory_id = GameId::new("memory");
        assert!(global.applies_to(Some(&memory_id)));
        assert!(snake.applies_to(Some(&snake_id)));
        assert!(!snake.applies_to(Some(&memory_id)));
        assert!(!snake.applies_to(None));
    }
}
