//! # monitoring-store
//!
//! In-memory chat state for the monitoring client.
//!
//! The crate exposes a synchronous [`ConversationStore`] that reconciles
//! every message the client observes (history fetches, optimistic sends,
//! live pushes) and derives the per-conversation views and unread counts
//! the chat widget renders. [`Roster`] keeps the contact lists.

pub mod contacts;
pub mod messages;
pub mod models;
pub mod store;
pub mod unread;

mod error;

pub use contacts::Roster;
pub use error::{Result, StoreError};
pub use messages::PushOutcome;
pub use models::*;
pub use store::ConversationStore;
pub use unread::UnreadIndex;
