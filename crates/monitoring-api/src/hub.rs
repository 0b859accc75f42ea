//! Real-time chat hub client with a tokio mpsc command/notification pattern.
//!
//! The hub task owns the link to the server. Callers talk to it through a
//! cloneable [`HubClient`]; each call is sent as an invocation frame with a
//! fresh invocation id and resolved when the matching completion arrives.
//! Server pushes come out of the notification channel returned by
//! [`spawn_hub`].
//!
//! The transport (websocket framing, handshake, reconnect) is not part of
//! this module. Whatever carries frames to the server plugs in as a
//! [`HubLink`].

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use monitoring_shared::protocol::{ChatMessageDto, HubFrame, HubInvocation, ServerEvent};
use monitoring_shared::types::{Contact, GroupId, MessageId, UserId};

use crate::error::HubError;

/// Channel capacity of the command and notification queues.
const CHANNEL_CAPACITY: usize = 256;

type Reply = oneshot::Sender<Result<Option<Value>, HubError>>;

// ---------------------------------------------------------------------------
// Link / command / notification types
// ---------------------------------------------------------------------------

/// Frame channels to and from the server.
#[derive(Debug)]
pub struct HubLink {
    pub outgoing: mpsc::Sender<HubFrame>,
    pub incoming: mpsc::Receiver<HubFrame>,
}

impl HubLink {
    /// Two connected ends: frames sent on one arrive on the other.
    pub fn pair() -> (HubLink, HubLink) {
        let (a_tx, a_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (b_tx, b_rx) = mpsc::channel(CHANNEL_CAPACITY);
        (
            HubLink {
                outgoing: a_tx,
                incoming: b_rx,
            },
            HubLink {
                outgoing: b_tx,
                incoming: a_rx,
            },
        )
    }
}

/// Commands sent *into* the hub task.
#[derive(Debug)]
pub enum HubCommand {
    /// Call a hub method and report its result.
    Invoke {
        invocation: HubInvocation,
        reply: Reply,
    },
    /// Close the link and stop.
    Shutdown,
}

/// Notifications sent *from* the hub task to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum HubNotification {
    /// The server pushed a message.
    Event(ServerEvent),
    /// The link is gone. Pending calls have failed with
    /// [`HubError::Disconnected`].
    Closed { reason: Option<String> },
}

// ---------------------------------------------------------------------------
// Client handle
// ---------------------------------------------------------------------------

/// Handle for calling hub methods. Clones share the same hub task.
#[derive(Debug, Clone)]
pub struct HubClient {
    commands: mpsc::Sender<HubCommand>,
}

impl HubClient {
    /// Call a hub method and wait for its raw result.
    pub async fn invoke(&self, invocation: HubInvocation) -> Result<Option<Value>, HubError> {
        let (reply, result) = oneshot::channel();
        self.commands
            .send(HubCommand::Invoke { invocation, reply })
            .await
            .map_err(|_| HubError::Disconnected)?;
        result.await.map_err(|_| HubError::Disconnected)?
    }

    async fn invoke_as<T: DeserializeOwned>(&self, invocation: HubInvocation) -> Result<T, HubError> {
        let method = invocation.method();
        let value = self.invoke(invocation).await?.unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| HubError::InvalidResult(format!("{method}: {e}")))
    }

    pub async fn get_friends(&self) -> Result<Vec<Contact>, HubError> {
        self.invoke_as(HubInvocation::GetFriends).await
    }

    pub async fn get_all_users_except_me(&self) -> Result<Vec<Contact>, HubError> {
        self.invoke_as(HubInvocation::GetAllUsersExceptMe).await
    }

    pub async fn get_private_messages(&self, friend_id: UserId) -> Result<Vec<ChatMessageDto>, HubError> {
        self.invoke_as(HubInvocation::GetPrivateMessages { friend_id })
            .await
    }

    pub async fn send_private_message(
        &self,
        friend_id: UserId,
        text: &str,
        client_message_id: Uuid,
    ) -> Result<(), HubError> {
        self.invoke(HubInvocation::SendPrivateMessage {
            friend_id,
            text: text.to_string(),
            client_message_id,
        })
        .await
        .map(drop)
    }

    pub async fn send_group_message(
        &self,
        group_id: GroupId,
        text: &str,
        client_message_id: Uuid,
    ) -> Result<(), HubError> {
        self.invoke(HubInvocation::SendGroupMessage {
            group_id,
            text: text.to_string(),
            client_message_id,
        })
        .await
        .map(drop)
    }

    pub async fn add_friend(&self, user_id: UserId) -> Result<(), HubError> {
        self.invoke(HubInvocation::AddFriend { user_id }).await.map(drop)
    }

    pub async fn remove_friend(&self, user_id: UserId) -> Result<(), HubError> {
        self.invoke(HubInvocation::RemoveFriend { user_id })
            .await
            .map(drop)
    }

    pub async fn delete_message(&self, message_id: MessageId) -> Result<(), HubError> {
        self.invoke(HubInvocation::DeleteMessage { message_id })
            .await
            .map(drop)
    }

    pub async fn clear_private_history(&self, friend_id: UserId) -> Result<(), HubError> {
        self.invoke(HubInvocation::ClearPrivateHistory { friend_id })
            .await
            .map(drop)
    }

    pub async fn clear_group_history(&self, group_id: GroupId) -> Result<(), HubError> {
        self.invoke(HubInvocation::ClearGroupHistory { group_id })
            .await
            .map(drop)
    }

    /// Ask the hub task to close the link. No-op once it is gone.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(HubCommand::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Start the hub task on `link`.
///
/// # Returns
///
/// `(client, notification_rx)`
pub fn spawn_hub(link: HubLink) -> (HubClient, mpsc::Receiver<HubNotification>) {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<HubCommand>(CHANNEL_CAPACITY);
    let (notif_tx, notif_rx) = mpsc::channel::<HubNotification>(CHANNEL_CAPACITY);
    let HubLink {
        outgoing,
        mut incoming,
    } = link;

    tokio::spawn(async move {
        let mut pending: HashMap<String, Reply> = HashMap::new();
        let mut next_invocation: u64 = 0;
        let mut close_reason: Option<String> = None;

        loop {
            tokio::select! {
                // --- Calls from the application ---
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(HubCommand::Invoke { invocation, reply }) => {
                            next_invocation += 1;
                            let invocation_id = next_invocation.to_string();
                            let method = invocation.method();

                            if outgoing.send(invocation.into_frame(invocation_id.clone())).await.is_err() {
                                warn!(method, "Hub link closed while sending");
                                let _ = reply.send(Err(HubError::Disconnected));
                                close_reason = Some("link closed".to_string());
                                break;
                            }
                            debug!(method, invocation_id = %invocation_id, "Hub call sent");
                            pending.insert(invocation_id, reply);
                        }
                        Some(HubCommand::Shutdown) => {
                            info!("Hub shutdown requested");
                            let _ = outgoing.send(HubFrame::Close { error: None }).await;
                            break;
                        }
                        None => {
                            // All clients dropped
                            info!("Command channel closed, shutting down hub");
                            break;
                        }
                    }
                }

                // --- Frames from the server ---
                frame = incoming.recv() => {
                    match frame {
                        Some(HubFrame::Completion { invocation_id, result, error }) => {
                            let Some(reply) = pending.remove(&invocation_id) else {
                                warn!(invocation_id = %invocation_id, "Completion for unknown call");
                                continue;
                            };
                            let outcome = match error {
                                Some(message) => {
                                    debug!(invocation_id = %invocation_id, error = %message, "Hub call failed");
                                    Err(HubError::Server(message))
                                }
                                None => Ok(result),
                            };
                            let _ = reply.send(outcome);
                        }
                        Some(HubFrame::Invocation { target, arguments, .. }) => {
                            match ServerEvent::from_invocation(&target, arguments) {
                                Ok(event) => {
                                    trace!(method = %target, msg_id = %event.message().id, "Server push");
                                    if notif_tx.send(HubNotification::Event(event)).await.is_err() {
                                        debug!("Notification receiver dropped");
                                    }
                                }
                                Err(e) => {
                                    warn!(method = %target, error = %e, "Dropping server invocation");
                                }
                            }
                        }
                        Some(HubFrame::Ping) => {
                            trace!("Hub ping");
                        }
                        Some(HubFrame::Close { error }) => {
                            info!(reason = ?error, "Hub closed by server");
                            close_reason = error;
                            break;
                        }
                        None => {
                            warn!("Hub link dropped");
                            close_reason = Some("link closed".to_string());
                            break;
                        }
                    }
                }
            }
        }

        let failed = pending.len();
        for (_, reply) in pending.drain() {
            let _ = reply.send(Err(HubError::Disconnected));
        }
        if failed > 0 {
            debug!(failed, "Pending hub calls failed on close");
        }
        let _ = notif_tx
            .send(HubNotification::Closed {
                reason: close_reason,
            })
            .await;
        info!("Hub task stopped");
    });

    (HubClient { commands: cmd_tx }, notif_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Server end that answers every call through `answer`.
    fn fake_server(
        mut server: HubLink,
        answer: impl Fn(&str, &[Value]) -> (Option<Value>, Option<String>) + Send + 'static,
    ) {
        tokio::spawn(async move {
            while let Some(frame) = server.incoming.recv().await {
                if let HubFrame::Invocation {
                    invocation_id: Some(invocation_id),
                    target,
                    arguments,
                } = frame
                {
                    let (result, error) = answer(&target, &arguments);
                    let _ = server
                        .outgoing
                        .send(HubFrame::Completion {
                            invocation_id,
                            result,
                            error,
                        })
                        .await;
                }
            }
        });
    }

    fn push(target: &str, id: i64) -> HubFrame {
        HubFrame::Invocation {
            invocation_id: None,
            target: target.to_string(),
            arguments: vec![json!({
                "id": id,
                "fromUserId": 2,
                "toUserId": 1,
                "messageText": "hi",
                "createdAt": "2025-03-01T10:00:00"
            })],
        }
    }

    #[tokio::test]
    async fn test_typed_call_results() {
        let (client_end, server_end) = HubLink::pair();
        fake_server(server_end, |target, args| match target {
            "GetFriends" => (Some(json!([{ "userId": 2, "userName": "Петров" }])), None),
            "GetPrivateMessages" => {
                assert_eq!(args, [json!(2)]);
                (Some(json!([])), None)
            }
            _ => (None, None),
        });
        let (hub, _notifications) = spawn_hub(client_end);

        let friends = hub.get_friends().await.unwrap();
        assert_eq!(friends[0].user_id, UserId(2));
        assert!(hub.get_private_messages(UserId(2)).await.unwrap().is_empty());
        hub.add_friend(UserId(3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_and_bad_result() {
        let (client_end, server_end) = HubLink::pair();
        fake_server(server_end, |target, _| match target {
            "DeleteMessage" => (None, Some("Message not found".into())),
            _ => (Some(json!("not a list")), None),
        });
        let (hub, _notifications) = spawn_hub(client_end);

        assert_eq!(
            hub.delete_message(MessageId(9)).await,
            Err(HubError::Server("Message not found".into()))
        );
        assert!(matches!(
            hub.get_all_users_except_me().await,
            Err(HubError::InvalidResult(_))
        ));
    }

    #[tokio::test]
    async fn test_pushes_become_notifications() {
        let (client_end, server_end) = HubLink::pair();
        let (_hub, mut notifications) = spawn_hub(client_end);

        server_end.outgoing.send(push("Unknown", 1)).await.unwrap();
        server_end.outgoing.send(HubFrame::Ping).await.unwrap();
        server_end
            .outgoing
            .send(push("ReceivePrivateMessage", 11))
            .await
            .unwrap();

        match notifications.recv().await.unwrap() {
            HubNotification::Event(ServerEvent::PrivateMessage(dto)) => {
                assert_eq!(dto.id, MessageId(11))
            }
            other => panic!("unexpected notification {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_fails_pending_calls() {
        let (client_end, mut server_end) = HubLink::pair();
        let (hub, mut notifications) = spawn_hub(client_end);

        let call = tokio::spawn({
            let hub = hub.clone();
            async move { hub.get_friends().await }
        });

        // wait until the call is on the wire, then close without answering
        let frame = server_end.incoming.recv().await.unwrap();
        assert!(matches!(frame, HubFrame::Invocation { .. }));
        server_end
            .outgoing
            .send(HubFrame::Close {
                error: Some("server restart".into()),
            })
            .await
            .unwrap();

        assert_eq!(call.await.unwrap(), Err(HubError::Disconnected));
        assert_eq!(
            notifications.recv().await.unwrap(),
            HubNotification::Closed {
                reason: Some("server restart".into())
            }
        );
        assert_eq!(hub.get_friends().await, Err(HubError::Disconnected));
    }

    #[tokio::test]
    async fn test_completions_matched_by_invocation_id() {
        let (client_end, mut server_end) = HubLink::pair();
        let (hub, _notifications) = spawn_hub(client_end);

        let first = tokio::spawn({
            let hub = hub.clone();
            async move { hub.get_friends().await }
        });
        let first_id = match server_end.incoming.recv().await.unwrap() {
            HubFrame::Invocation { invocation_id, .. } => invocation_id.unwrap(),
            other => panic!("unexpected frame {other:?}"),
        };
        let second = tokio::spawn({
            let hub = hub.clone();
            async move { hub.get_all_users_except_me().await }
        });
        let second_id = match server_end.incoming.recv().await.unwrap() {
            HubFrame::Invocation { invocation_id, .. } => invocation_id.unwrap(),
            other => panic!("unexpected frame {other:?}"),
        };
        assert_ne!(first_id, second_id);

        // answer in reverse order
        for (id, name) in [(second_id, "all"), (first_id, "friend")] {
            server_end
                .outgoing
                .send(HubFrame::Completion {
                    invocation_id: id,
                    result: Some(json!([{ "userId": 5, "userName": name }])),
                    error: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(first.await.unwrap().unwrap()[0].user_name, "friend");
        assert_eq!(second.await.unwrap().unwrap()[0].user_name, "all");
    }

    #[tokio::test]
    async fn test_shutdown_sends_close() {
        let (client_end, mut server_end) = HubLink::pair();
        let (hub, mut notifications) = spawn_hub(client_end);

        hub.shutdown().await;
        assert_eq!(
            server_end.incoming.recv().await.unwrap(),
            HubFrame::Close { error: None }
        );
        assert_eq!(
            notifications.recv().await.unwrap(),
            HubNotification::Closed { reason: None }
        );
    }
}
