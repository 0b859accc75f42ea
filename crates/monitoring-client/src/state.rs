//! Application state shared by every page.
//!
//! [`AppState`] owns the configuration, the session, the API client and,
//! once the hub is connected, the chat widget. The widget lives here rather
//! than in a page so it survives navigation.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use monitoring_api::hub::HubLink;
use monitoring_api::{ApiClient, ClientConfig, CredentialStore, Session};
use monitoring_shared::identity::Identity;

use crate::chat::ChatWidget;
use crate::error::{ClientError, Result};
use crate::events::EventSink;
use crate::hub_bridge::start_hub_and_bridge;
use crate::routes::Route;

/// Where the hub transport connects, and the bearer token it presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEndpoint {
    pub url: String,
    pub access_token: String,
}

pub struct AppState {
    pub config: ClientConfig,
    pub session: Session,
    pub api: ApiClient,

    /// The page currently shown.
    pub route: Route,

    /// `None` until the hub link is attached.
    chat: Option<ChatWidget>,
    bridge: Option<JoinHandle<()>>,
    events: EventSink,
}

impl AppState {
    /// Restore the persisted session and build the API client.
    pub fn new(config: ClientConfig, events: EventSink) -> Result<Self> {
        let storage = match &config.credentials_path {
            Some(path) => CredentialStore::open_at(path),
            None => CredentialStore::default_location()?,
        };
        debug!(path = %storage.path().display(), "Using credential store");
        let session = Session::restore(storage)?;
        Self::with_session(config, session, events)
    }

    pub fn with_session(config: ClientConfig, session: Session, events: EventSink) -> Result<Self> {
        let api = ApiClient::new(&config, session.clone())?;
        let route = Route::Home.resolve(session.is_authenticated());
        Ok(Self {
            config,
            session,
            api,
            route,
            chat: None,
            bridge: None,
            events,
        })
    }

    /// Who is signed in, decoded from the session token.
    pub fn identity(&self) -> Result<Identity> {
        let credentials = self.session.snapshot();
        let token = credentials.token.ok_or(ClientError::NotAuthenticated)?;
        Ok(Identity::from_token(
            &token,
            credentials.user_name.unwrap_or_default(),
        )?)
    }

    /// Go to `path`, or to login when the target needs a session.
    pub fn navigate(&mut self, path: &str) -> Route {
        let route = Route::parse(path).resolve(self.session.is_authenticated());
        debug!(path, route = %route, "Navigate");
        self.route = route;
        route
    }

    /// The hub endpoint for the signed-in user.
    pub fn hub_endpoint(&self) -> Result<HubEndpoint> {
        let access_token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(HubEndpoint {
            url: self.config.hub_url(),
            access_token,
        })
    }

    /// Connect the chat widget to the hub over `link`.
    pub fn attach_hub(&mut self, link: HubLink) -> Result<ChatWidget> {
        let identity = self.identity()?;
        let (widget, bridge) = start_hub_and_bridge(link, identity.user_id, self.events.clone());
        info!(hub = %self.config.hub_url(), user_id = %identity.user_id, "Chat hub attached");
        if let Some(previous) = self.bridge.replace(bridge) {
            previous.abort();
        }
        self.chat = Some(widget.clone());
        Ok(widget)
    }

    pub fn chat(&self) -> Option<&ChatWidget> {
        self.chat.as_ref()
    }

    /// Clear the session, drop the chat, and return to the login page.
    pub async fn logout(&mut self) -> Result<Route> {
        if let Some(chat) = self.chat.take() {
            chat.hub().shutdown().await;
        }
        if let Some(bridge) = self.bridge.take() {
            bridge.abort();
        }
        self.api.logout()?;
        info!("Logged out");
        self.route = Route::Login;
        Ok(Route::Login)
    }
}
