//! Storage seam used by the pipeline

use laurel_core::{
    AchievementDefinition, AchievementId, FactSource, GameId, GameplayEvent, UnlockRecord, UserId,
};
use laurel_db::{GrantOutcome, Result, Store, UnlockGrant};

/// Everything the pipeline reads and writes
///
/// [`Store`] is the production implementation. Uniqueness of unlock records
/// and atomicity of the reward are guarantees of `grant_unlock`, not of the
/// pipeline.
pub trait AchievementStore: FactSource + Send + Sync {
    /// Append a gameplay event
    fn append_event(&self, event: &GameplayEvent) -> Result<u64>;

    /// Active definitions for a game plus global ones
    fn active_definitions_for(&self, game_id: Option<&GameId>) -> Result<Vec<AchievementDefinition>>;

    /// Every definition in the catalog
    fn all_definitions(&self) -> Result<Vec<AchievementDefinition>>;

    /// Whether the pair already has an unlock record
    fn is_unlocked(&self, user_id: &UserId, achievement_id: &AchievementId) -> Result<bool>;

    /// Insert-if-absent the unlock record and apply its reward atomically
    fn grant_unlock(&self, grant: &UnlockGrant) -> Result<GrantOutcome>;

    /// A user's unlock records, oldest first
    fn unlocks_for_user(&self, user_id: &UserId) -> Result<Vec<UnlockRecord>>;
}

impl AchievementStore for Store {
    fn append_event(&self, event: &GameplayEvent) -> Result<u64> {
        Store::append_event(self, event)
    }

    fn active_definitions_for(&self, game_id: Option<&GameId>) -> Result<Vec<AchievementDefinition>> {
        Store::active_definitions_for(self, game_id)
    }

    fn all_definitions(&self) -> Result<Vec<AchievementDefinition>> {
        Store::all_definitions(self)
    }

    fn is_unlocked(&self, user_id: &UserId, achievement_id: &AchievementId) -> Result<bool> {
        Store::is_unlocked(self, user_id, achievement_id)
    }

    fn grant_unlock(&self, grant: &UnlockGrant) -> Result<GrantOutcome> {
        Store::grant_unlock(self, grant)
    }

    fn unlocks_for_user(&self, user_id: &UserId) -> Result<Vec<UnlockRecord>> {
        Store::unlocks_for_user(self, user_id)
    }
}
