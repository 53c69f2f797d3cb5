//! Gameplay events
//!
//! Append-only facts about what a user did. Aggregate conditions are
//! answered by counting these.

use crate::identity::{GameId, UserId};
use crate::value::ValueMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of gameplay fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A game session was played
    Played,
    /// A score was recorded (value = score)
    ScoreAchieved,
    /// A game was played during the night window
    NightPlay,
}

impl EventKind {
    /// Storage name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Played => "game_played",
            EventKind::ScoreAchieved => "score",
            EventKind::NightPlay => "night_play",
        }
    }

    /// Look up a kind by its storage name
    pub fn parse(name: &str) -> Option<Self> {
        [EventKind::Played, EventKind::ScoreAchieved, EventKind::NightPlay]
            .into_iter()
            .find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable fact about something a user did in a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayEvent {
    pub user_id: UserId,
    pub kind: EventKind,
    pub value: f64,
    pub game_id: Option<GameId>,
    #[serde(default)]
    pub metadata: ValueMap,
    pub timestamp: DateTime<Utc>,
}

impl GameplayEvent {
    /// Create an event without metadata
    pub fn new(
        user_id: UserId,
        kind: EventKind,
        value: f64,
        game_id: Option<GameId>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind,
            value,
            game_id,
            metadata: ValueMap::new(),
            timestamp,
        }
    }

    /// Attach submission metadata
    pub fn with_metadata(mut self, metadata: ValueMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether this is a score record with a positive score
    pub fn is_positive_score(&self) -> bool {
        self.kind == EventKind::ScoreAchieved && self.value > 0.0
    }
}
