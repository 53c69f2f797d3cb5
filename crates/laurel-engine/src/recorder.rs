//! Best-effort gameplay event recording

use crate::store::AchievementStore;
use chrono::Utc;
use laurel_core::{EventKind, GameId, GameplayEvent, NightWindow, UserId, ValueMap, WallClock};
use std::sync::Arc;
use tracing::warn;

/// Appends gameplay facts to the event log
///
/// Write failures are logged and swallowed: losing an event must never abort
/// the score save that produced it.
pub struct EventRecorder<S> {
    store: Arc<S>,
    clock: Arc<dyn WallClock>,
    night_window: NightWindow,
}

impl<S: AchievementStore> EventRecorder<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn WallClock>, night_window: NightWindow) -> Self {
        Self {
            store,
            clock,
            night_window,
        }
    }

    /// Append one fact; returns its sequence number when the write succeeded
    ///
    /// A `Played` event whose local hour falls in the night window also
    /// appends a synthetic `NightPlay` event.
    pub fn record_event(
        &self,
        user_id: &UserId,
        kind: EventKind,
        value: f64,
        game_id: Option<&GameId>,
        metadata: &ValueMap,
    ) -> Option<u64> {
        let local = self.clock.now();
        let timestamp = local.with_timezone(&Utc);
        let event = GameplayEvent::new(user_id.clone(), kind, value, game_id.cloned(), timestamp)
            .with_metadata(metadata.clone());
        let id = self.append(&event);

        if kind == EventKind::Played && self.night_window.contains(&local) {
            let night = GameplayEvent::new(
                user_id.clone(),
                EventKind::NightPlay,
                1.0,
                game_id.cloned(),
                timestamp,
            );
            self.append(&night);
        }
        id
    }

    /// Record the facts of one score submission: a play and a score record
    pub fn record_submission(&self, user_id: &UserId, game_id: &GameId, score: f64, metadata: &ValueMap) {
        self.record_event(user_id, EventKind::Played, 1.0, Some(game_id), &ValueMap::new());
        self.record_event(user_id, EventKind::ScoreAchieved, score, Some(game_id), metadata);
    }

    fn append(&self, event: &GameplayEvent) -> Option<u64> {
        match self.store.append_event(event) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(
                    user_id = %event.user_id,
                    kind = %event.kind,
                    error = %err,
                    "failed to record gameplay event"
                );
                None
            }
        }
    }
}
