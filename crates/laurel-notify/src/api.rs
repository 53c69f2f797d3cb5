//! Score submission responses

use crate::delivery::Delivery;
use crate::error::Result;
use laurel_core::UnlockedAchievement;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Body returned for a score submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub success: bool,
    /// Unlocks produced by this submission; absent when there were none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_achievements: Option<Vec<UnlockedAchievement>>,
}

impl ScoreResponse {
    /// A successful response carrying `unlocked`, omitting the list when empty
    pub fn with_achievements(unlocked: Vec<UnlockedAchievement>) -> Self {
        Self {
            success: true,
            new_achievements: (!unlocked.is_empty()).then_some(unlocked),
        }
    }

    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Client side of score submission
#[derive(Debug, Clone)]
pub struct ApiClient {
    delivery: Arc<Delivery>,
}

impl ApiClient {
    pub fn new(delivery: Arc<Delivery>) -> Self {
        Self { delivery }
    }

    pub fn delivery(&self) -> &Arc<Delivery> {
        &self.delivery
    }

    /// Forward the response's new unlocks to the subscriber
    ///
    /// Returns how many the subscriber accepted.
    pub fn handle_score_response(&self, response: &ScoreResponse) -> usize {
        match response.new_achievements.as_deref() {
            Some(unlocked) if !unlocked.is_empty() => {
                debug!(count = unlocked.len(), "delivering new achievements");
                self.delivery.deliver(unlocked)
            }
            _ => 0,
        }
    }

    /// Parse a raw response body and forward its unlocks
    pub fn handle_score_body(&self, body: &str) -> Result<usize> {
        let response = ScoreResponse::from_json(body)?;
        Ok(self.handle_score_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NotificationService, SchedulerConfig, SchedulerEvent};
    use tokio::sync::mpsc;

    #[test]
    fn test_response_wire_format() {
        let body = r#"{"success":true,"newAchievements":[
            {"id":"snake_500","title":"Snake Charmer","icon":"🐍","xpReward":100,"isSecret":false}
        ]}"#;
        let response = ScoreResponse::from_json(body).unwrap();
        let unlocked = response.new_achievements.as_ref().unwrap();
        assert_eq!(unlocked[0].id.as_str(), "snake_500");
        assert_eq!(unlocked[0].xp_reward, 100);

        let empty = ScoreResponse::with_achievements(Vec::new());
        assert_eq!(empty.to_json().unwrap(), r#"{"success":true}"#);
        assert_eq!(ScoreResponse::from_json(r#"{"success":true}"#).unwrap(), empty);
    }

    #[tokio::test]
    async fn test_response_reaches_scheduler_once() {
        let (view, mut events) = mpsc::unbounded_channel();
        let service = NotificationService::spawn(SchedulerConfig::default(), view);
        let delivery = Arc::new(Delivery::new());
        // Mounting twice must not double-deliver
        delivery.register_sender(service.sender());
        delivery.register_sender(service.sender());
        let client = ApiClient::new(delivery);

        let body = r#"{"success":true,"newAchievements":[
            {"id":"first","title":"Welcome","icon":"👋","xpReward":10},
            {"id":"bad","title":"Broken","icon":"","xpReward":10}
        ]}"#;
        // Only the well-formed unlock is accepted
        assert_eq!(client.handle_score_body(body).unwrap(), 1);

        match events.recv().await.unwrap() {
            SchedulerEvent::Shown { item, .. } => assert_eq!(item.id, "first"),
            other => panic!("unexpected event {other:?}"),
        }
        // Malformed payload was dropped, nothing else queued
        service.clear_all().unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            SchedulerEvent::Cleared { dropped: 1, .. }
        ));
    }
}
