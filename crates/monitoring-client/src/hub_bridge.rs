use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use monitoring_api::hub::{spawn_hub, HubLink, HubNotification};
use monitoring_shared::types::UserId;

use crate::chat::ChatWidget;
use crate::events::{emit_event, EventSink, UiEvent};

/// Start the hub task on `link`, build the chat widget for `me`, and spawn
/// the loop that routes server pushes into it.
pub fn start_hub_and_bridge(
    link: HubLink,
    me: UserId,
    events: EventSink,
) -> (ChatWidget, JoinHandle<()>) {
    let (hub, notif_rx) = spawn_hub(link);
    let widget = ChatWidget::new(me, hub, events.clone());
    info!(user = %me, "Chat hub started");

    let bridge = tokio::spawn(notification_loop(widget.clone(), events, notif_rx));
    (widget, bridge)
}

/// Receive hub notifications until the hub closes.
pub async fn notification_loop(
    widget: ChatWidget,
    events: EventSink,
    mut notif_rx: mpsc::Receiver<HubNotification>,
) {
    info!("Hub notification bridge started");

    while let Some(notification) = notif_rx.recv().await {
        match notification {
            HubNotification::Event(event) => {
                let msg_id = event.message().id;
                match widget.handle_push(event) {
                    Ok(outcome) => debug!(msg_id = %msg_id, outcome = ?outcome, "Push routed"),
                    Err(e) => warn!(msg_id = %msg_id, error = %e, "Dropping invalid push"),
                }
            }
            HubNotification::Closed { reason } => {
                warn!(reason = ?reason, "Hub connection closed");
                emit_event(&events, UiEvent::HubClosed { reason });
                break;
            }
        }
    }

    info!("Hub notification bridge stopped");
}
