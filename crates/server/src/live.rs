// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Real-time comment rooms.
//!
//! Each ticket has a room keyed `ticket_<id>`. Clients connect over a
//! WebSocket and send `join_room` / `leave_room` frames; every comment
//! event published to a joined room is forwarded to them.
//!
//! # Architecture
//!
//! - One `tokio::sync::broadcast` channel per room, created on first join
//! - A room is dropped as soon as its last subscription goes away
//! - Publishing never blocks and never fails the request that caused it
//! - Joining a room is not access controlled

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use zordon_hub_api::{Broadcaster, CommentEvent, ticket_channel};

/// Maximum number of events to buffer per room.
/// If a client cannot keep up, older events are dropped for it.
const EVENT_BUFFER_SIZE: usize = 100;

/// Maximum number of outgoing frames queued per connection.
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Start receiving a ticket's comment events.
    JoinRoom {
        /// The ticket whose room to join.
        ticket_id: i64,
    },
    /// Stop receiving a ticket's comment events.
    LeaveRoom {
        /// The ticket whose room to leave.
        ticket_id: i64,
    },
}

/// Frames the server sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (RFC 3339).
        timestamp: String,
    },
    /// A `join_room` was accepted.
    Joined {
        /// The room joined.
        channel: String,
    },
    /// A `leave_room` was accepted.
    Left {
        /// The room left.
        channel: String,
    },
    /// A comment event from a joined room.
    Event {
        /// The room the event was published to.
        channel: String,
        /// The event itself.
        event: CommentEvent,
    },
    /// The last client frame could not be understood.
    Error {
        /// What went wrong.
        message: String,
    },
}

/// Registry of per-ticket rooms.
#[derive(Default)]
pub struct TicketRooms {
    rooms: Mutex<HashMap<String, broadcast::Sender<CommentEvent>>>,
}

impl TicketRooms {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<CommentEvent>>> {
        self.rooms
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Subscribes to a room, creating it if needed.
    ///
    /// Events published before subscription are not received.
    pub fn subscribe(self: &Arc<Self>, channel: &str) -> RoomSubscription {
        let rx = self
            .lock()
            .entry(String::from(channel))
            .or_insert_with(|| broadcast::channel(EVENT_BUFFER_SIZE).0)
            .subscribe();
        RoomSubscription {
            rooms: Arc::clone(self),
            channel: String::from(channel),
            rx: Some(rx),
        }
    }

    /// Drops a room that no subscription listens to any more.
    fn release(&self, channel: &str) {
        let mut rooms = self.lock();
        if rooms
            .get(channel)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            rooms.remove(channel);
            debug!(channel, "Released empty room");
        }
    }

    /// Number of rooms that currently exist.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.lock().len()
    }
}

/// One listener on one room. Dropping it releases the room once no other
/// subscription remains.
pub struct RoomSubscription {
    rooms: Arc<TicketRooms>,
    channel: String,
    rx: Option<broadcast::Receiver<CommentEvent>>,
}

impl RoomSubscription {
    /// The room this subscription listens to.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Waits for the next event in the room.
    ///
    /// # Errors
    ///
    /// Returns `Lagged` if events were dropped for this subscription, or
    /// `Closed` if the room is gone.
    pub async fn recv(&mut self) -> Result<CommentEvent, broadcast::error::RecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => Err(broadcast::error::RecvError::Closed),
        }
    }

    /// Takes the next event if one is already queued.
    ///
    /// # Errors
    ///
    /// Returns `Empty` when nothing is queued.
    pub fn try_recv(&mut self) -> Result<CommentEvent, broadcast::error::TryRecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.try_recv(),
            None => Err(broadcast::error::TryRecvError::Closed),
        }
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        // The receiver must be gone before the count is checked.
        drop(self.rx.take());
        self.rooms.release(&self.channel);
    }
}

impl Broadcaster for TicketRooms {
    fn publish(&self, channel: &str, event: &CommentEvent) {
        let mut rooms = self.lock();
        let Some(sender) = rooms.get(channel) else {
            debug!(channel, event = event.name(), "No room for event");
            return;
        };

        match sender.send(event.clone()) {
            Ok(receivers) => {
                debug!(channel, event = event.name(), receivers, "Published room event");
            }
            Err(_) => {
                debug!(channel, "Room has no listeners, dropping it");
                rooms.remove(channel);
            }
        }
    }
}

/// Handles WebSocket upgrade requests for comment rooms.
pub async fn live_rooms_handler(
    ws: WebSocketUpgrade,
    AxumState(rooms): AxumState<Arc<TicketRooms>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, rooms))
}

/// Forwards one room's events into a connection's outbound queue until the
/// room closes or the connection goes away. Aborting the task drops the
/// subscription, which releases the room.
fn spawn_forwarder(
    mut subscription: RoomSubscription,
    out: mpsc::Sender<ServerFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let channel: String = String::from(subscription.channel());
        loop {
            tokio::select! {
                () = out.closed() => break,
                received = subscription.recv() => match received {
                    Ok(event) => {
                        let frame = ServerFrame::Event {
                            channel: channel.clone(),
                            event,
                        };
                        if out.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(channel = %channel, skipped, "Client lagging, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

fn parse_frame(text: &str) -> Result<ClientFrame, String> {
    serde_json::from_str(text).map_err(|e| format!("Unrecognised frame: {e}"))
}

/// Handles an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, rooms: Arc<TicketRooms>) {
    info!("Client connected to comment rooms");

    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(OUTBOUND_BUFFER_SIZE);

    let connected = ServerFrame::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if out_tx.send(connected).await.is_err() {
        return;
    }

    // Task for writing frames to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize room frame");
                }
            }
        }
    });

    // Task for reading join/leave frames from the client
    let mut recv_task = tokio::spawn(async move {
        let mut joined: HashMap<String, JoinHandle<()>> = HashMap::new();

        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let reply: ServerFrame = match parse_frame(text.as_str()) {
                        Ok(ClientFrame::JoinRoom { ticket_id }) => {
                            let channel: String = ticket_channel(ticket_id);
                            if !joined.contains_key(&channel) {
                                let subscription = rooms.subscribe(&channel);
                                let handle = spawn_forwarder(subscription, out_tx.clone());
                                joined.insert(channel.clone(), handle);
                            }
                            debug!(channel = %channel, "Client joined room");
                            ServerFrame::Joined { channel }
                        }
                        Ok(ClientFrame::LeaveRoom { ticket_id }) => {
                            let channel: String = ticket_channel(ticket_id);
                            if let Some(handle) = joined.remove(&channel) {
                                handle.abort();
                            }
                            debug!(channel = %channel, "Client left room");
                            ServerFrame::Left { channel }
                        }
                        Err(message) => {
                            warn!(%message, "Ignoring client frame");
                            ServerFrame::Error { message }
                        }
                    };
                    if out_tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    warn!("Received binary frame from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }

        for handle in joined.into_values() {
            handle.abort();
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from comment rooms");
}
