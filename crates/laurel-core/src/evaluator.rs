//! Condition evaluation
//!
//! [`ConditionEvaluator`] is the seam the unlock coordinator calls through.
//! [`RuleEvaluator`] is the default implementation: an exhaustive match over
//! [`ConditionKind`], one small function per kind.

use crate::context::TriggerContext;
use crate::definition::{AchievementDefinition, ConditionKind};
use crate::error::Result;
use crate::event::EventKind;
use crate::facts::FactSource;
use crate::identity::UserId;
use crate::rng::{ChanceSource, SharedRng};
use tracing::trace;

/// Decides whether a definition's condition holds for a user
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluate `definition` for `user_id` against the triggering submission.
    ///
    /// Definitions whose condition type has no handler evaluate to `false`.
    fn evaluate(
        &self,
        facts: &dyn FactSource,
        user_id: &UserId,
        definition: &AchievementDefinition,
        context: &TriggerContext,
    ) -> Result<bool>;
}

/// Default rule set
pub struct RuleEvaluator<C = SharedRng> {
    chance: C,
    streak_probability: f64,
    random_chance_probability: f64,
}

impl RuleEvaluator<SharedRng> {
    /// Create an evaluator with a clock-seeded RNG and default probabilities
    pub fn new() -> Self {
        Self::with_chance(SharedRng::from_entropy())
    }
}

impl Default for RuleEvaluator<SharedRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ChanceSource> RuleEvaluator<C> {
    /// Default probability of a `streak` roll succeeding
    pub const DEFAULT_STREAK_PROBABILITY: f64 = 0.5;
    /// Default probability of a `random_chance` roll succeeding
    pub const DEFAULT_RANDOM_CHANCE_PROBABILITY: f64 = 0.3;

    /// Create an evaluator rolling through the given chance source
    pub fn with_chance(chance: C) -> Self {
        Self {
            chance,
            streak_probability: Self::DEFAULT_STREAK_PROBABILITY,
            random_chance_probability: Self::DEFAULT_RANDOM_CHANCE_PROBABILITY,
        }
    }

    /// Override the roll probabilities
    pub fn with_probabilities(mut self, streak: f64, random_chance: f64) -> Self {
        self.streak_probability = streak.clamp(0.0, 1.0);
        self.random_chance_probability = random_chance.clamp(0.0, 1.0);
        self
    }

    fn evaluate_kind(
        &self,
        kind: ConditionKind,
        facts: &dyn FactSource,
        user_id: &UserId,
        definition: &AchievementDefinition,
        context: &TriggerContext,
    ) -> Result<bool> {
        let threshold = definition.condition_value;
        match kind {
            ConditionKind::ScoreThreshold => Ok(score_threshold(context, threshold)),
            ConditionKind::TotalEventCount => total_event_count(facts, user_id, threshold),
            ConditionKind::CompletionCount => {
                completion_count(facts, user_id, definition, context, threshold)
            }
            ConditionKind::AccountExists => facts.user_exists(user_id),
            ConditionKind::StreakProbabilistic => Ok(self.chance.chance(self.streak_probability)),
            ConditionKind::UnlockCount => unlock_count(facts, user_id, threshold),
            ConditionKind::TimeUnder => Ok(time_under(context, threshold)),
            ConditionKind::SpeedOver => Ok(speed_over(context, threshold)),
            ConditionKind::SecretAlwaysTrue => Ok(true),
            ConditionKind::RandomChance => Ok(self.chance.chance(self.random_chance_probability)),
            ConditionKind::NightFlagPresent => facts.has_event(user_id, EventKind::NightPlay),
        }
    }
}

impl<C: ChanceSource> ConditionEvaluator for RuleEvaluator<C> {
    fn evaluate(
        &self,
        facts: &dyn FactSource,
        user_id: &UserId,
        definition: &AchievementDefinition,
        context: &TriggerContext,
    ) -> Result<bool> {
        let Some(kind) = definition.condition_kind() else {
            trace!(
                achievement_id = %definition.id,
                condition_type = %definition.condition_type,
                "no handler for condition type"
            );
            return Ok(false);
        };
        self.evaluate_kind(kind, facts, user_id, definition, context)
    }
}

fn score_threshold(context: &TriggerContext, threshold: f64) -> bool {
    context.score >= threshold
}

fn total_event_count(facts: &dyn FactSource, user_id: &UserId, threshold: f64) -> Result<bool> {
    let played = facts.count_events(user_id, EventKind::Played)?;
    Ok(played as f64 >= threshold)
}

fn completion_count(
    facts: &dyn FactSource,
    user_id: &UserId,
    definition: &AchievementDefinition,
    context: &TriggerContext,
    threshold: f64,
) -> Result<bool> {
    // Counted per game; without any game there is nothing to count
    let Some(game_id) = context.game_id.as_ref().or(definition.game_id.as_ref()) else {
        return Ok(false);
    };
    let completions = facts.count_positive_scores(user_id, game_id)?;
    Ok(completions as f64 >= threshold)
}

fn unlock_count(facts: &dyn FactSource, user_id: &UserId, threshold: f64) -> Result<bool> {
    let unlocked = facts.count_unlocks(user_id)?;
    Ok(unlocked as f64 >= threshold)
}

fn time_under(context: &TriggerContext, threshold: f64) -> bool {
    context.time().is_some_and(|time| time <= threshold)
}

fn speed_over(context: &TriggerContext, threshold: f64) -> bool {
    context.speed().is_some_and(|speed| speed >= threshold)
}
