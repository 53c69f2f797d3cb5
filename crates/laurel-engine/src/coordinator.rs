//! Exactly-once unlock coordination
//!
//! Each (user, achievement) pair moves `Locked -> Evaluating -> Unlocked`,
//! and `Unlocked` is terminal. No lock is taken here: concurrent
//! evaluations of the same pair may both decide to unlock, and the store's
//! insert-if-absent grant lets exactly one of them write the record and the
//! reward. A failed grant leaves the pair `Locked`, so the next triggering
//! event evaluates it again.

use crate::error::{Error, Result};
use crate::store::AchievementStore;
use chrono::{DateTime, Utc};
use laurel_core::{
    AchievementDefinition, ConditionEvaluator, ConditionKind, FactSource, TriggerContext,
    UnlockedAchievement, UserId,
};
use laurel_db::{GrantOutcome, UnlockGrant};
use std::sync::Arc;
use tracing::{debug, trace};

/// What happened to one definition during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Newly unlocked by this call; the reward was applied
    Unlocked(UnlockedAchievement),
    /// Already unlocked, before this call or by a concurrent one
    AlreadyUnlocked,
    /// Evaluated and not satisfied
    ConditionNotMet,
    /// A secret definition whose trigger was not reported
    NotTriggered,
    /// No handler for the definition's condition type
    NoHandler,
}

/// Decides and applies unlocks for single definitions
pub struct UnlockCoordinator {
    evaluator: Arc<dyn ConditionEvaluator>,
    secret_currency_bonus: u64,
}

impl UnlockCoordinator {
    pub fn new(evaluator: Arc<dyn ConditionEvaluator>, secret_currency_bonus: u64) -> Self {
        Self {
            evaluator,
            secret_currency_bonus,
        }
    }

    /// Currency bonus granted alongside secret achievements
    pub fn secret_currency_bonus(&self) -> u64 {
        self.secret_currency_bonus
    }

    /// Evaluate `definition` for `user_id` and unlock it if satisfied.
    ///
    /// Read failures come back as [`Error::Query`], failed grants as
    /// [`Error::Transaction`]; in both cases nothing was written.
    pub fn try_unlock<S: AchievementStore>(
        &self,
        store: &S,
        user_id: &UserId,
        definition: &AchievementDefinition,
        context: &TriggerContext,
        now: DateTime<Utc>,
    ) -> Result<UnlockOutcome> {
        let Some(kind) = definition.condition_kind() else {
            trace!(achievement_id = %definition.id, "skipping definition without handler");
            return Ok(UnlockOutcome::NoHandler);
        };
        if kind == ConditionKind::SecretAlwaysTrue && !context.secret_triggered() {
            return Ok(UnlockOutcome::NotTriggered);
        }

        let already = store
            .is_unlocked(user_id, &definition.id)
            .map_err(|e| Error::Query(e.to_string()))?;
        if already {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let facts: &dyn FactSource = store;
        if !self.evaluator.evaluate(facts, user_id, definition, context)? {
            return Ok(UnlockOutcome::ConditionNotMet);
        }

        let grant = UnlockGrant {
            user_id: user_id.clone(),
            achievement_id: definition.id.clone(),
            xp_reward: definition.xp_reward,
            currency_bonus: if definition.is_secret {
                self.secret_currency_bonus
            } else {
                0
            },
            unlocked_at: now,
        };
        match store.grant_unlock(&grant).map_err(Error::Transaction)? {
            GrantOutcome::Granted(_) => Ok(UnlockOutcome::Unlocked(UnlockedAchievement::from(definition))),
            GrantOutcome::AlreadyUnlocked => {
                debug!(
                    user_id = %user_id,
                    achievement_id = %definition.id,
                    "lost unlock race; record already present"
                );
                Ok(UnlockOutcome::AlreadyUnlocked)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laurel_core::{FixedChance, RuleEvaluator, Value, ValueMap};
    use laurel_db::Store;

    fn coordinator() -> UnlockCoordinator {
        UnlockCoordinator::new(Arc::new(RuleEvaluator::with_chance(FixedChance(true))), 50)
    }

    fn store_with_user() -> (Store, UserId) {
        let store = Store::in_memory().unwrap();
        let user = UserId::new("u1");
        store.register_user(&user, "Ada").unwrap();
        (store, user)
    }

    fn score(score: f64) -> TriggerContext {
        TriggerContext::new(None, score, ValueMap::new())
    }

    #[test]
    fn test_unlock_then_already_unlocked() {
        let (store, user) = store_with_user();
        let def = AchievementDefinition::new("s500", "Score 500", ConditionKind::ScoreThreshold, 500.0).with_xp(100);
        let coordinator = coordinator();

        let first = coordinator.try_unlock(&store, &user, &def, &score(600.0), Utc::now()).unwrap();
        assert!(matches!(first, UnlockOutcome::Unlocked(ref a) if a.id == def.id));
        let second = coordinator.try_unlock(&store, &user, &def, &score(700.0), Utc::now()).unwrap();
        assert_eq!(second, UnlockOutcome::AlreadyUnlocked);

        let state = store.reward_state(&user).unwrap().unwrap();
        assert_eq!(state.total_xp, 100);
        assert_eq!(state.currency_balance, 0);
    }

    #[test]
    fn test_condition_not_met_writes_nothing() {
        let (store, user) = store_with_user();
        let def = AchievementDefinition::new("s500", "Score 500", ConditionKind::ScoreThreshold, 500.0).with_xp(100);

        let outcome = coordinator().try_unlock(&store, &user, &def, &score(10.0), Utc::now()).unwrap();
        assert_eq!(outcome, UnlockOutcome::ConditionNotMet);
        assert!(!store.is_unlocked(&user, &def.id).unwrap());
    }

    #[test]
    fn test_secret_requires_trigger_and_pays_bonus() {
        let (store, user) = store_with_user();
        let def = AchievementDefinition::new("konami", "???", ConditionKind::SecretAlwaysTrue, 0.0)
            .with_xp(250)
            .secret();
        let coordinator = coordinator();

        let quiet = coordinator.try_unlock(&store, &user, &def, &score(1.0), Utc::now()).unwrap();
        assert_eq!(quiet, UnlockOutcome::NotTriggered);

        let mut metadata = ValueMap::new();
        metadata.insert("secret".into(), Value::Bool(true));
        let ctx = TriggerContext::new(None, 1.0, metadata);
        let outcome = coordinator.try_unlock(&store, &user, &def, &ctx, Utc::now()).unwrap();
        assert!(matches!(outcome, UnlockOutcome::Unlocked(_)));

        let state = store.reward_state(&user).unwrap().unwrap();
        assert_eq!(state.total_xp, 250);
        assert_eq!(state.currency_balance, 50);
    }

    #[test]
    fn test_unknown_condition_type_is_skipped() {
        let (store, user) = store_with_user();
        let mut def = AchievementDefinition::new("future", "Future", ConditionKind::ScoreThreshold, 0.0);
        def.condition_type = "weekly_streak".into();
        let outcome = coordinator().try_unlock(&store, &user, &def, &score(1e6), Utc::now()).unwrap();
        assert_eq!(outcome, UnlockOutcome::NoHandler);
    }

    #[test]
    fn test_failed_grant_leaves_pair_locked() {
        let (store, user) = store_with_user();
        store
            .set_reward_state(&laurel_core::UserRewardState {
                user_id: user.clone(),
                total_xp: u64::MAX,
                currency_balance: 0,
            })
            .unwrap();
        let def = AchievementDefinition::new("s1", "Score 1", ConditionKind::ScoreThreshold, 1.0).with_xp(1);

        let result = coordinator().try_unlock(&store, &user, &def, &score(5.0), Utc::now());
        assert!(matches!(result, Err(Error::Transaction(_))));
        assert!(!store.is_unlocked(&user, &def.id).unwrap());

        // Once the balance is corrected, the next triggering event unlocks it
        store
            .set_reward_state(&laurel_core::UserRewardState {
                user_id: user.clone(),
                total_xp: 0,
                currency_balance: 0,
            })
            .unwrap();
        let retry = coordinator().try_unlock(&store, &user, &def, &score(5.0), Utc::now()).unwrap();
        assert!(matches!(retry, UnlockOutcome::Unlocked(_)));
    }
}
