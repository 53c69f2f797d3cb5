//! Common query patterns for the database.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use laurel_core::{
    AchievementDefinition, EventKind, FactSource, GameId, GameplayEvent, UnlockRecord, UserId,
};

impl Store {
    /// Load every event row for a user.
    fn stored_events_for_user(&self, user_id: &UserId) -> Result<Vec<StoredEvent>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredEvent>(StoredEventKey::user_id)?;
        let iter = scan.start_with(user_id.as_str().to_string())?;
        let events: std::result::Result<Vec<StoredEvent>, _> = iter.collect();
        let events = events.map_err(|e| Error::Database(e.to_string()))?;
        // Prefix scan; keep exact matches only ("u1" must not see "u10")
        Ok(events
            .into_iter()
            .filter(|e| e.user_id == user_id.as_str())
            .collect())
    }

    /// Get all events for a user, in append order.
    pub fn events_for_user(&self, user_id: &UserId) -> Result<Vec<GameplayEvent>> {
        let mut stored = self.stored_events_for_user(user_id)?;
        stored.sort_by_key(|e| e.id);
        Ok(stored.iter().filter_map(|e| e.to_event()).collect())
    }

    /// Count a user's events of one kind.
    pub fn count_events_of_kind(&self, user_id: &UserId, kind: EventKind) -> Result<u64> {
        let events = self.stored_events_for_user(user_id)?;
        Ok(events.iter().filter(|e| e.is_kind(kind)).count() as u64)
    }

    /// Count a user's positive-score records for one game.
    pub fn count_positive_scores_for_game(&self, user_id: &UserId, game_id: &GameId) -> Result<u64> {
        let events = self.stored_events_for_user(user_id)?;
        Ok(events
            .iter()
            .filter(|e| e.is_kind(EventKind::ScoreAchieved))
            .filter(|e| e.value > 0.0)
            .filter(|e| e.game_id.as_deref() == Some(game_id.as_str()))
            .count() as u64)
    }

    /// Whether a user record exists.
    pub fn has_user(&self, user_id: &UserId) -> Result<bool> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredUser> = r.get().primary(user_id.as_str().to_string())?;
        Ok(stored.is_some())
    }

    /// Get all unlock records for a user, oldest first.
    pub fn unlocks_for_user(&self, user_id: &UserId) -> Result<Vec<UnlockRecord>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredUnlock>(StoredUnlockKey::user_id)?;
        let iter = scan.start_with(user_id.as_str().to_string())?;
        let unlocks: std::result::Result<Vec<StoredUnlock>, _> = iter.collect();
        let unlocks = unlocks.map_err(|e| Error::Database(e.to_string()))?;
        let mut records: Vec<UnlockRecord> = unlocks
            .into_iter()
            .filter(|u| u.user_id == user_id.as_str())
            .map(|u| u.to_record())
            .collect();
        records.sort_by(|a, b| {
            a.unlocked_at
                .cmp(&b.unlocked_at)
                .then_with(|| a.achievement_id.cmp(&b.achievement_id))
        });
        Ok(records)
    }

    /// Count unlock records for a user.
    pub fn count_unlocks_for_user(&self, user_id: &UserId) -> Result<u64> {
        Ok(self.unlocks_for_user(user_id)?.len() as u64)
    }

    /// Get all definitions, ordered by ID.
    pub fn all_definitions(&self) -> Result<Vec<AchievementDefinition>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredDefinition>()?;
        let iter = scan.all()?;
        let defs: std::result::Result<Vec<StoredDefinition>, _> = iter.collect();
        let defs = defs.map_err(|e| Error::Database(e.to_string()))?;
        Ok(defs.iter().map(|d| d.to_definition()).collect())
    }

    /// Get active definitions that apply to a game, including global ones.
    pub fn active_definitions_for(&self, game_id: Option<&GameId>) -> Result<Vec<AchievementDefinition>> {
        Ok(self
            .all_definitions()?
            .into_iter()
            .filter(|d| d.is_active && d.applies_to(game_id))
            .collect())
    }
}

impl FactSource for Store {
    fn count_events(&self, user_id: &UserId, kind: EventKind) -> laurel_core::Result<u64> {
        Ok(self.count_events_of_kind(user_id, kind)?)
    }

    fn count_positive_scores(&self, user_id: &UserId, game_id: &GameId) -> laurel_core::Result<u64> {
        Ok(self.count_positive_scores_for_game(user_id, game_id)?)
    }

    fn user_exists(&self, user_id: &UserId) -> laurel_core::Result<bool> {
        Ok(self.has_user(user_id)?)
    }

    fn count_unlocks(&self, user_id: &UserId) -> laurel_core::Result<u64> {
        Ok(self.count_unlocks_for_user(user_id)?)
    }
}
