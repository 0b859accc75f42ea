//! # monitoring-client
//!
//! The headless dashboard client: pages, routing, and the chat widget that
//! keeps a [`monitoring_store::ConversationStore`] in sync with the hub.

pub mod chat;
pub mod error;
pub mod events;
pub mod hub_bridge;
pub mod pages;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

use tracing_subscriber::{fmt, EnvFilter};

pub use chat::{ChatTab, ChatWidget};
pub use error::{ClientError, Result};
pub use events::{event_channel, UiEvent};
pub use routes::Route;
pub use state::{AppState, HubEndpoint};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("monitoring_client=debug,monitoring_api=debug,monitoring_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
