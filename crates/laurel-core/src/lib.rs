//! Laurel Core - Achievement rules and condition evaluation
//!
//! This crate provides the storage-independent half of the achievement engine:
//! - Typed identifiers for users, games and achievements
//! - Dynamic metadata values (`Value`, `ValueMap`) attached to gameplay submissions
//! - Achievement definitions and the closed set of condition kinds
//! - Gameplay events, unlock records and reward state
//! - The `ConditionEvaluator` seam and its default `RuleEvaluator`
//! - Chance sources (deterministic xorshift RNG) and wall-clock time
//!
//! Aggregate lookups the evaluator needs (event counts, unlock counts) are
//! answered through the `FactSource` trait, which the storage layer implements.

mod context;
mod definition;
mod error;
mod evaluator;
mod event;
mod facts;
mod identity;
mod reward;
mod rng;
pub mod time;
mod value;

pub use context::{TriggerContext, METADATA_SECRET, METADATA_SPEED, METADATA_TIME};
pub use definition::{AchievementDefinition, ConditionKind, Scope};
pub use error::{Error, Result};
pub use evaluator::{ConditionEvaluator, RuleEvaluator};
pub use event::{EventKind, GameplayEvent};
pub use facts::FactSource;
pub use identity::{AchievementId, GameId, UserId};
pub use reward::{UnlockRecord, UnlockedAchievement, UserRewardState};
pub use rng::{ChanceSource, FixedChance, GameRng, SharedRng};
pub use time::{FixedClock, NightWindow, SystemClock, WallClock};
pub use value::{Value, ValueMap};
