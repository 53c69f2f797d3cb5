//! Laurel Engine - Achievement evaluation and unlocking
//!
//! Invoked synchronously by the score-submission endpoint:
//!
//! 1. [`EventRecorder`] appends the gameplay facts (best-effort)
//! 2. [`EvaluationPipeline`] fetches candidate definitions for the game
//! 3. [`UnlockCoordinator`] evaluates each and grants qualifying unlocks
//!
//! Nothing in this crate fails the caller's score save: every error is
//! logged and degrades to "no achievement unlocked this time".

mod config;
mod coordinator;
mod error;
mod pipeline;
mod recorder;
mod store;

pub use config::EngineConfig;
pub use coordinator::{UnlockCoordinator, UnlockOutcome};
pub use error::{Error, Result};
pub use pipeline::{AchievementStatus, EvaluationPipeline};
pub use recorder::EventRecorder;
pub use store::AchievementStore;
