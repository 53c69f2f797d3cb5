//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use chrono::{DateTime, Utc};
use laurel_core::{
    AchievementDefinition, AchievementId, GameplayEvent, UnlockRecord, UserId, UserRewardState,
};
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const EVENT_SEQUENCE: &str = "events";

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredEvent>().unwrap();
    models.define::<StoredSequence>().unwrap();
    models.define::<StoredUser>().unwrap();
    models.define::<StoredUnlock>().unwrap();
    models.define::<StoredDefinition>().unwrap();
    models
});

/// A reward-bearing unlock to apply atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockGrant {
    pub user_id: UserId,
    pub achievement_id: AchievementId,
    pub xp_reward: u64,
    pub currency_bonus: u64,
    pub unlocked_at: DateTime<Utc>,
}

/// Result of [`Store::grant_unlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The record was inserted and the reward applied.
    Granted(UnlockRecord),
    /// A record already existed; nothing was written.
    AlreadyUnlocked,
}

/// Database store for achievement state.
///
/// Cheap to share behind an `Arc`; write transactions are serialized by the
/// underlying database.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create a user record if it does not exist yet.
    ///
    /// Returns true when a new record was created.
    pub fn register_user(&self, user_id: &UserId, display_name: &str) -> Result<bool> {
        let rw = self.db.rw_transaction()?;
        let existing: Option<StoredUser> = rw.get().primary(user_id.as_str().to_string())?;
        if existing.is_some() {
            return Ok(false);
        }
        rw.insert(StoredUser {
            id: user_id.as_str().to_string(),
            display_name: display_name.to_string(),
            total_xp: 0,
            currency_balance: 0,
            created_at: Utc::now().timestamp_millis(),
        })?;
        rw.commit()?;
        Ok(true)
    }

    /// Load a user's reward state.
    pub fn reward_state(&self, user_id: &UserId) -> Result<Option<UserRewardState>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredUser> = r.get().primary(user_id.as_str().to_string())?;
        Ok(stored.map(|u| u.to_reward_state()))
    }

    /// Append a gameplay event, returning its sequence number.
    pub fn append_event(&self, event: &GameplayEvent) -> Result<u64> {
        let rw = self.db.rw_transaction()?;
        let sequence: Option<StoredSequence> = rw.get().primary(EVENT_SEQUENCE.to_string())?;
        let id = sequence.map(|s| s.next).unwrap_or(1);
        rw.insert(StoredEvent::from_event(id, event)?)?;
        rw.upsert(StoredSequence {
            name: EVENT_SEQUENCE.to_string(),
            next: id + 1,
        })?;
        rw.commit()?;
        Ok(id)
    }

    /// Save a definition, replacing any existing one with the same ID.
    pub fn upsert_definition(&self, def: &AchievementDefinition) -> Result<()> {
        let stored = StoredDefinition::from_definition(def);
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        Ok(())
    }

    /// Save many definitions in one transaction.
    pub fn upsert_definitions<'a>(
        &self,
        defs: impl IntoIterator<Item = &'a AchievementDefinition>,
    ) -> Result<usize> {
        let rw = self.db.rw_transaction()?;
        let mut count = 0;
        for def in defs {
            rw.upsert(StoredDefinition::from_definition(def))?;
            count += 1;
        }
        rw.commit()?;
        Ok(count)
    }

    /// Load a definition by ID.
    pub fn definition(&self, id: &AchievementId) -> Result<Option<AchievementDefinition>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredDefinition> = r.get().primary(id.as_str().to_string())?;
        Ok(stored.map(|d| d.to_definition()))
    }

    /// Whether the user already unlocked the achievement.
    pub fn is_unlocked(&self, user_id: &UserId, achievement_id: &AchievementId) -> Result<bool> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredUnlock> = r
            .get()
            .primary(StoredUnlock::key_for(user_id, achievement_id))?;
        Ok(stored.is_some())
    }

    /// Insert an unlock record and apply its reward atomically.
    ///
    /// The record is inserted only if absent. The XP and currency deltas are
    /// applied in the same transaction, so a caller that loses a race for the
    /// same pair observes [`GrantOutcome::AlreadyUnlocked`] and no reward.
    /// Any error drops the transaction uncommitted: neither the record nor
    /// the reward becomes visible.
    pub fn grant_unlock(&self, grant: &UnlockGrant) -> Result<GrantOutcome> {
        let rw = self.db.rw_transaction()?;

        let key = StoredUnlock::key_for(&grant.user_id, &grant.achievement_id);
        let existing: Option<StoredUnlock> = rw.get().primary(key)?;
        if existing.is_some() {
            return Ok(GrantOutcome::AlreadyUnlocked);
        }

        let record = UnlockRecord {
            user_id: grant.user_id.clone(),
            achievement_id: grant.achievement_id.clone(),
            unlocked_at: grant.unlocked_at,
        };
        rw.insert(StoredUnlock::from_record(&record))?;

        let user: Option<StoredUser> = rw.get().primary(grant.user_id.as_str().to_string())?;
        let mut user = user.ok_or_else(|| Error::NotFound(format!("user {}", grant.user_id)))?;
        let overflow = || Error::RewardOverflow {
            user_id: grant.user_id.as_str().to_string(),
        };
        user.total_xp = user.total_xp.checked_add(grant.xp_reward).ok_or_else(overflow)?;
        user.currency_balance = user
            .currency_balance
            .checked_add(grant.currency_bonus)
            .ok_or_else(overflow)?;
        rw.upsert(user)?;

        rw.commit()?;
        debug!(
            user_id = %grant.user_id,
            achievement_id = %grant.achievement_id,
            xp = grant.xp_reward,
            currency = grant.currency_bonus,
            "unlock committed"
        );
        Ok(GrantOutcome::Granted(record))
    }

    /// Set a user's balances directly (administrative correction).
    pub fn set_reward_state(&self, state: &UserRewardState) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let user: Option<StoredUser> = rw.get().primary(state.user_id.as_str().to_string())?;
        let mut user = user.ok_or_else(|| Error::NotFound(format!("user {}", state.user_id)))?;
        user.total_xp = state.total_xp;
        user.currency_balance = state.currency_balance;
        rw.upsert(user)?;
        rw.commit()?;
        Ok(())
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laurel_core::{ConditionKind, EventKind};

    fn store_with_user(user: &str) -> Store {
        let store = Store::in_memory().unwrap();
        store.register_user(&UserId::new(user), user).unwrap();
        store
    }

    fn grant(user: &str, achievement: &str, xp: u64, currency: u64) -> UnlockGrant {
        UnlockGrant {
            user_id: UserId::new(user),
            achievement_id: AchievementId::new(achievement),
            xp_reward: xp,
            currency_bonus: currency,
            unlocked_at: Utc::now(),
        }
    }

    #[test]
    fn test_register_user_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let user = UserId::new("u1");
        assert!(store.register_user(&user, "Ada").unwrap());
        assert!(!store.register_user(&user, "Ada").unwrap());
        let state = store.reward_state(&user).unwrap().unwrap();
        assert_eq!(state.total_xp, 0);
        assert_eq!(state.currency_balance, 0);
    }

    #[test]
    fn test_append_event_assigns_sequence() {
        let store = Store::in_memory().unwrap();
        let event = GameplayEvent::new(UserId::new("u1"), EventKind::Played, 1.0, None, Utc::now());
        assert_eq!(store.append_event(&event).unwrap(), 1);
        assert_eq!(store.append_event(&event).unwrap(), 2);
    }

    #[test]
    fn test_definition_round_trip() {
        let store = Store::in_memory().unwrap();
        let def = AchievementDefinition::new("snake_500", "Snake Charmer", ConditionKind::ScoreThreshold, 500.0)
            .for_game("snake")
            .with_xp(100);
        store.upsert_definition(&def).unwrap();
        assert_eq!(store.definition(&def.id).unwrap(), Some(def));
        assert_eq!(store.definition(&AchievementId::new("missing")).unwrap(), None);
    }

    #[test]
    fn test_grant_unlock_applies_reward_once() {
        let store = store_with_user("u1");
        let user = UserId::new("u1");

        let first = store.grant_unlock(&grant("u1", "secret_tunnel", 50, 25)).unwrap();
        assert!(matches!(first, GrantOutcome::Granted(_)));
        let second = store.grant_unlock(&grant("u1", "secret_tunnel", 50, 25)).unwrap();
        assert_eq!(second, GrantOutcome::AlreadyUnlocked);

        let state = store.reward_state(&user).unwrap().unwrap();
        assert_eq!(state.total_xp, 50);
        assert_eq!(state.currency_balance, 25);
        assert!(store.is_unlocked(&user, &AchievementId::new("secret_tunnel")).unwrap());
    }

    #[test]
    fn test_grant_unlock_rolls_back_on_overflow() {
        let store = store_with_user("u1");
        let user = UserId::new("u1");
        store
            .set_reward_state(&UserRewardState {
                user_id: user.clone(),
                total_xp: u64::MAX - 10,
                currency_balance: 7,
            })
            .unwrap();

        let result = store.grant_unlock(&grant("u1", "big", 100, 5));
        assert!(matches!(result, Err(Error::RewardOverflow { .. })));

        assert!(!store.is_unlocked(&user, &AchievementId::new("big")).unwrap());
        let state = store.reward_state(&user).unwrap().unwrap();
        assert_eq!(state.total_xp, u64::MAX - 10);
        assert_eq!(state.currency_balance, 7);
    }

    #[test]
    fn test_grant_unlock_requires_user() {
        let store = Store::in_memory().unwrap();
        let result = store.grant_unlock(&grant("ghost", "a", 10, 0));
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(!store
            .is_unlocked(&UserId::new("ghost"), &AchievementId::new("a"))
            .unwrap());
    }
}
