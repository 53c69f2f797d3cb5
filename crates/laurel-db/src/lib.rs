//! Laurel DB - Database layer using native_db
//!
//! Provides persistent storage for:
//! - Achievement definitions (the rule catalog)
//! - The append-only gameplay event log
//! - User records with accumulated rewards
//! - Unlock records, unique per (user, achievement)
//!
//! Unlocks are granted through [`Store::grant_unlock`], which inserts the
//! record and applies the reward inside one write transaction.

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use store::{GrantOutcome, Store, UnlockGrant};
