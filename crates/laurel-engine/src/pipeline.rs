//! Evaluation pipeline - record, fetch, evaluate, unlock
//!
//! Entry point for the score-submission endpoint. The pipeline never returns
//! an error: read failures skip the affected definition, failed unlock
//! transactions roll back and leave the achievement for a later event.

use crate::config::EngineConfig;
use crate::coordinator::{UnlockCoordinator, UnlockOutcome};
use crate::error::{Error, Result};
use crate::recorder::EventRecorder;
use crate::store::AchievementStore;
use chrono::{DateTime, Utc};
use laurel_core::{
    AchievementId, ConditionEvaluator, GameId, SystemClock, TriggerContext, UnlockedAchievement,
    UserId, ValueMap, WallClock,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// An achievement as listed for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: u64,
    pub game_id: Option<GameId>,
    pub is_secret: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Orchestrates achievement processing for score submissions
pub struct EvaluationPipeline<S> {
    store: Arc<S>,
    recorder: EventRecorder<S>,
    coordinator: UnlockCoordinator,
    clock: Arc<dyn WallClock>,
}

impl<S: AchievementStore> EvaluationPipeline<S> {
    /// Build a pipeline with the configured rule evaluator and the system clock
    pub fn new(store: Arc<S>, config: &EngineConfig) -> Self {
        Self::with_parts(
            store,
            Arc::new(config.rule_evaluator()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Build a pipeline from explicit collaborators
    pub fn with_parts(
        store: Arc<S>,
        evaluator: Arc<dyn ConditionEvaluator>,
        clock: Arc<dyn WallClock>,
        config: &EngineConfig,
    ) -> Self {
        let recorder = EventRecorder::new(store.clone(), clock.clone(), config.night_window);
        Self {
            store,
            recorder,
            coordinator: UnlockCoordinator::new(evaluator, config.secret_currency_bonus),
            clock,
        }
    }

    /// The event recorder, for facts reported outside score submissions
    pub fn recorder(&self) -> &EventRecorder<S> {
        &self.recorder
    }

    /// Process one score submission and return what it newly unlocked.
    ///
    /// Infallible by contract: the caller's score save must never depend on
    /// achievement processing.
    pub fn check_achievements(
        &self,
        user_id: &UserId,
        game_id: &GameId,
        score: f64,
        metadata: ValueMap,
    ) -> Vec<UnlockedAchievement> {
        self.recorder.record_submission(user_id, game_id, score, &metadata);

        let candidates = match self.store.active_definitions_for(Some(game_id)) {
            Ok(defs) => defs,
            Err(err) => {
                warn!(user_id = %user_id, game_id = %game_id, error = %err, "failed to load achievement definitions");
                return Vec::new();
            }
        };

        let context = TriggerContext::new(Some(game_id.clone()), score, metadata);
        let now = self.clock.now().with_timezone(&Utc);
        let mut unlocked = Vec::new();

        for definition in &candidates {
            match self
                .coordinator
                .try_unlock(self.store.as_ref(), user_id, definition, &context, now)
            {
                Ok(UnlockOutcome::Unlocked(achievement)) => {
                    info!(
                        user_id = %user_id,
                        achievement_id = %achievement.id,
                        xp = achievement.xp_reward,
                        "achievement unlocked"
                    );
                    unlocked.push(achievement);
                }
                Ok(_) => {}
                Err(Error::Transaction(err)) => {
                    error!(
                        user_id = %user_id,
                        achievement_id = %definition.id,
                        error = %err,
                        "unlock transaction rolled back"
                    );
                }
                Err(err) => {
                    warn!(
                        user_id = %user_id,
                        achievement_id = %definition.id,
                        error = %err,
                        "skipping achievement after failed lookup"
                    );
                }
            }
        }

        debug!(
            user_id = %user_id,
            game_id = %game_id,
            candidates = candidates.len(),
            unlocked = unlocked.len(),
            "achievement check complete"
        );
        unlocked
    }

    /// List active achievements for a user with their unlock times.
    ///
    /// Locked secret achievements are listed with their details hidden.
    pub fn progress(&self, user_id: &UserId) -> Result<Vec<AchievementStatus>> {
        let definitions = self
            .store
            .all_definitions()
            .map_err(|e| Error::Query(e.to_string()))?;
        let unlocks: HashMap<AchievementId, DateTime<Utc>> = self
            .store
            .unlocks_for_user(user_id)
            .map_err(|e| Error::Query(e.to_string()))?
            .into_iter()
            .map(|u| (u.achievement_id, u.unlocked_at))
            .collect();

        Ok(definitions
            .into_iter()
            .filter(|d| d.is_active)
            .map(|d| {
                let unlocked_at = unlocks.get(&d.id).copied();
                let hidden = d.is_secret && unlocked_at.is_none();
                AchievementStatus {
                    title: if hidden { "???".to_string() } else { d.title },
                    description: if hidden { String::new() } else { d.description },
                    id: d.id,
                    icon: if hidden { "???".to_string() } else { d.icon },
                    xp_reward: d.xp_reward,
                    game_id: d.game_id,
                    is_secret: d.is_secret,
                    unlocked_at,
                }
            })
            .collect())
    }
}
