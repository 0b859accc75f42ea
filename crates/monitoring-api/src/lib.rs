//! # monitoring-api
//!
//! Backend access for the monitoring client.
//!
//! - [`ApiClient`]: one async function per backend HTTP endpoint, each in
//!   the module of its area (auth, work items, requests, settings,
//!   notifications, performance)
//! - [`Session`]: the bearer token and user details, persisted through a
//!   [`CredentialStore`]
//! - [`hub`]: the real-time chat hub task and its typed client
//! - [`ClientConfig`]: environment-driven settings

pub mod auth;
pub mod client;
pub mod config;
pub mod dates;
pub mod error;
pub mod hub;
pub mod my_requests;
pub mod notifications;
pub mod performance;
pub mod response;
pub mod session;
pub mod settings;
pub mod work_items;

#[cfg(test)]
mod test_server;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, HubError, Result, SessionError};
pub use hub::{spawn_hub, HubClient, HubLink, HubNotification};
pub use response::ActionResponse;
pub use session::{CredentialStore, Credentials, Session};
