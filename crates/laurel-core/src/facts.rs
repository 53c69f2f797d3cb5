//! Aggregate lookups needed by condition evaluation

use crate::error::Result;
use crate::event::EventKind;
use crate::identity::{GameId, UserId};

/// Read-only view of the event log, user records and unlocks
///
/// Implemented by the storage layer. Failures surface as
/// [`Error::Facts`](crate::Error::Facts) and are treated by callers as
/// recoverable: the definition being evaluated is skipped.
pub trait FactSource {
    /// Number of events of `kind` recorded for the user
    fn count_events(&self, user_id: &UserId, kind: EventKind) -> Result<u64>;

    /// Number of positive-score records for the user on one game
    fn count_positive_scores(&self, user_id: &UserId, game_id: &GameId) -> Result<u64>;

    /// Whether a user record exists
    fn user_exists(&self, user_id: &UserId) -> Result<bool>;

    /// Number of achievements the user has unlocked
    fn count_unlocks(&self, user_id: &UserId) -> Result<u64>;

    /// Whether at least one event of `kind` exists for the user
    fn has_event(&self, user_id: &UserId, kind: EventKind) -> Result<bool> {
        Ok(self.count_events(user_id, kind)? > 0)
    }
}
