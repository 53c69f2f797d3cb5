//! Trigger context passed to condition evaluation

use crate::identity::GameId;
use crate::value::ValueMap;

/// Metadata key for the reported completion time
pub const METADATA_TIME: &str = "time";
/// Metadata key for the reported speed
pub const METADATA_SPEED: &str = "speed";
/// Metadata key a game sets when a secret trigger fired
pub const METADATA_SECRET: &str = "secret";

/// What the current submission reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerContext {
    pub game_id: Option<GameId>,
    pub score: f64,
    pub metadata: ValueMap,
}

impl TriggerContext {
    /// Create a context for a score submission
    pub fn new(game_id: Option<GameId>, score: f64, metadata: ValueMap) -> Self {
        Self {
            game_id,
            score,
            metadata,
        }
    }

    /// Numeric metadata entry, if present and numeric
    pub fn metadata_number(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(|v| v.as_float())
    }

    /// Reported completion time
    pub fn time(&self) -> Option<f64> {
        self.metadata_number(METADATA_TIME)
    }

    /// Reported speed
    pub fn speed(&self) -> Option<f64> {
        self.metadata_number(METADATA_SPEED)
    }

    /// Whether the game reported its secret trigger
    pub fn secret_triggered(&self) -> bool {
        self.metadata
            .get(METADATA_SECRET)
            .map(|v| v.is_truthy())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_metadata_accessors() {
        let mut metadata = ValueMap::new();
        metadata.insert("time".into(), Value::Int(42));
        metadata.insert("speed".into(), Value::String("7.5".into()));
        metadata.insert("secret".into(), Value::Bool(true));
        let ctx = TriggerContext::new(None, 0.0, metadata);

        assert_eq!(ctx.time(), Some(42.0));
        assert_eq!(ctx.speed(), Some(7.5));
        assert!(ctx.secret_triggered());
        assert!(!TriggerContext::default().secret_triggered());
    }
}
