//! Laurel Script - RON catalog loader
//!
//! Loads achievement catalogs from RON files and seeds them into the store.
//! A catalog file looks like:
//!
//! ```ron
//! (
//!     achievements: [
//!         (
//!             id: "snake_500",
//!             title: "Snake Charmer",
//!             icon: "🐍",
//!             game_id: Some("snake"),
//!             condition_type: "score_threshold",
//!             condition_value: 500.0,
//!             xp_reward: 100,
//!         ),
//!     ]
//! )
//! ```

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{Catalog, Loader};
pub use schema::achievement::{AchievementDef, AchievementDefs};
