//! Laurel Notify - Client-side unlock notifications
//!
//! Turns the unlock lists carried by score-submission responses into a
//! one-at-a-time, timed, dismissible notification sequence:
//!
//! - [`ApiClient`] reads a [`ScoreResponse`] and hands new unlocks to the
//!   registered [`Delivery`] subscriber
//! - [`NotificationSender`] validates payloads and feeds the scheduler
//! - [`NotificationScheduler`] is the pure `Idle`/`Showing` state machine
//! - [`NotificationService`] drives the scheduler on a tokio task and owns
//!   its only timer; dropping the service cancels it

mod api;
mod config;
mod delivery;
mod error;
mod item;
mod scheduler;
mod service;

pub use api::{ApiClient, ScoreResponse};
pub use config::SchedulerConfig;
pub use delivery::Delivery;
pub use error::{Error, Result};
pub use item::NotificationItem;
pub use scheduler::{DismissReason, NotificationScheduler, Phase, SchedulerEvent, Tick, TimerId};
pub use service::{NotificationSender, NotificationService, NotificationView};
