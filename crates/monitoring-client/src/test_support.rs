//! Fake hub and message builders for widget and bridge tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use monitoring_api::hub::{spawn_hub, HubLink, HubNotification};
use monitoring_shared::protocol::{timestamp, ChatMessageDto, HubFrame};
use monitoring_shared::types::{Addressee, MessageId, UserId};

use crate::chat::ChatWidget;
use crate::events::{event_channel, UiEvent};

pub(crate) const ME: UserId = UserId(1);

pub(crate) struct FakeHub {
    pub widget: ChatWidget,
    /// Inject frames as if the server sent them.
    pub server: mpsc::Sender<HubFrame>,
    pub notifications: Option<mpsc::Receiver<HubNotification>>,
    events: mpsc::UnboundedReceiver<UiEvent>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeHub {
    /// Calls received so far, as `Method[args…]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// A widget for user [`ME`] whose hub calls are answered by `answer`.
/// `Err` becomes a completion error.
pub(crate) fn fake_hub(
    answer: impl Fn(&str, &[Value]) -> Result<Value, String> + Send + 'static,
) -> FakeHub {
    let (client_end, mut server_end) = HubLink::pair();
    let (hub, notifications) = spawn_hub(client_end);
    let (sink, events) = event_channel();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let server = server_end.outgoing.clone();
    let recorded = calls.clone();
    tokio::spawn(async move {
        while let Some(frame) = server_end.incoming.recv().await {
            let HubFrame::Invocation {
                invocation_id: Some(invocation_id),
                target,
                arguments,
            } = frame
            else {
                continue;
            };
            recorded
                .lock()
                .unwrap()
                .push(format!("{target}{}", Value::Array(arguments.clone())));

            let (result, error) = match answer(&target, &arguments) {
                Ok(value) => (Some(value), None),
                Err(message) => (None, Some(message)),
            };
            let _ = server_end
                .outgoing
                .send(HubFrame::Completion {
                    invocation_id,
                    result,
                    error,
                })
                .await;
        }
    });

    FakeHub {
        widget: ChatWidget::new(ME, hub, sink),
        server,
        notifications: Some(notifications),
        events,
        calls,
    }
}

pub(crate) fn dto(
    id: i64,
    from: i64,
    to: Addressee,
    text: &str,
    created_at: &str,
    client_message_id: Option<uuid::Uuid>,
) -> ChatMessageDto {
    let (to_user_id, group_id) = match to {
        Addressee::Direct(user) => (Some(user), None),
        Addressee::Group(group) => (None, Some(group)),
    };
    ChatMessageDto {
        id: MessageId(id),
        from_user_id: UserId(from),
        to_user_id,
        group_id,
        message_text: text.to_string(),
        created_at: at(created_at),
        client_message_id,
    }
}

pub(crate) fn at(raw: &str) -> DateTime<Utc> {
    timestamp::parse(raw).unwrap()
}

/// An unsigned token carrying `user_id` in the name-identifier claim.
pub(crate) fn token_for(user_id: i64) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let mut claims = serde_json::Map::new();
    claims.insert(
        monitoring_shared::constants::CLAIM_NAME_IDENTIFIER.to_string(),
        Value::String(user_id.to_string()),
    );
    let claims = Value::Object(claims);
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Serve `router` on an ephemeral local port as a fake backend and return
/// a client for it holding a token for [`ME`].
pub(crate) async fn backend(router: axum::Router) -> monitoring_api::ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = monitoring_api::ClientConfig {
        base_url: format!("http://{addr}"),
        page_size: 20,
        ..monitoring_api::ClientConfig::default()
    };
    let session = monitoring_api::Session::in_memory();
    session.sign_in(&token_for(ME.0), "Тестов", None).unwrap();
    monitoring_api::ApiClient::new(&config, session).unwrap()
}
