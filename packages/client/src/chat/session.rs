//! Chat session: the join/talk/leave state machine over one socket.
//!
//! ```text
//! Closed --connect()--> Connecting --(socket open)--> Open --join()--> Joined
//!   ^                                                                     |
//!   +---------------- leave() / unexpected close -------------------------+
//! ```
//!
//! The session owns the socket, the [`MessageLog`] of the joined room and the
//! reconnect policy. The UI observes it only through [`ChatEvent`]s.
//!
//! ## Epochs
//!
//! Every `connect()` and `leave()` bumps an epoch. Background work (the socket
//! driver, a reconnect loop, a join waiting on the directory) carries the epoch
//! it started under and stops as soon as it no longer matches, so a stale task
//! can never join a room or write to the log.

use std::sync::{Arc, PoisonError};

use tokio::{
    sync::{Mutex, mpsc},
    task::AbortHandle,
};

use barcart_shared::{
    protocol::{ChatFrame, MemberId},
    time::Clock,
};

use crate::{
    config::ReconnectPolicy,
    directory::RoomDirectory,
    error::ChatError,
};

use super::{
    domain::{ConnectionState, backoff_delay, should_attempt_reconnect, validate_message},
    log::MessageLog,
    transport::{Connector, TransportEvent},
};

/// Notifications delivered to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A frame was added to the message log
    Message(ChatFrame),
    StateChanged(ConnectionState),
    Error(ChatError),
    /// An automatic reconnect attempt is about to start
    Reconnecting { attempt: u32, max_attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoomContext {
    room_id: String,
    member_id: MemberId,
}

struct Inner {
    state: ConnectionState,
    epoch: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    room: Option<RoomContext>,
    log: MessageLog,
}

impl Inner {
    fn send(&self, frame: &ChatFrame) -> Result<(), ChatError> {
        let outbound = self.outbound.as_ref().ok_or(ChatError::NotConnected)?;
        let json = serde_json::to_string(frame).map_err(|e| ChatError::Transport(e.to_string()))?;
        outbound.send(json).map_err(|_| ChatError::NotConnected)
    }
}

struct Shared {
    url: String,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    directory: Arc<dyn RoomDirectory>,
    clock: Arc<dyn Clock>,
    events: mpsc::UnboundedSender<ChatEvent>,
    inner: Mutex<Inner>,
    /// Kept outside `inner` so the driver can be stopped without its lock
    driver: std::sync::Mutex<Option<AbortHandle>>,
}

/// One realtime connection for one room context
pub struct ChatSession {
    shared: Arc<Shared>,
}

impl ChatSession {
    /// Create a closed session and the event stream the UI listens on
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        connector: Arc<dyn Connector>,
        directory: Arc<dyn RoomDirectory>,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            url: url.into(),
            policy,
            connector,
            directory,
            clock,
            events,
            inner: Mutex::new(Inner {
                state: ConnectionState::Closed,
                epoch: 0,
                outbound: None,
                room: None,
                log: MessageLog::new(),
            }),
            driver: std::sync::Mutex::new(None),
        });
        (Self { shared }, events_rx)
    }

    pub async fn state(&self) -> ConnectionState {
        self.shared.inner.lock().await.state
    }

    /// Snapshot of the message log in display order
    pub async fn messages(&self) -> Vec<ChatFrame> {
        self.shared.inner.lock().await.log.entries().to_vec()
    }

    /// Room of the current (or last disconnected) join
    pub async fn room_id(&self) -> Option<String> {
        let inner = self.shared.inner.lock().await;
        inner.room.as_ref().map(|room| room.room_id.clone())
    }

    /// Open the socket. Resolves once it is open (`Open` state).
    ///
    /// # Errors
    ///
    /// - [`ChatError::AlreadyConnected`] unless the session is `Closed`
    /// - [`ChatError::Transport`] if the socket cannot be opened
    pub async fn connect(&self) -> Result<(), ChatError> {
        let epoch = {
            let mut inner = self.shared.inner.lock().await;
            if inner.state != ConnectionState::Closed {
                return Err(ChatError::AlreadyConnected);
            }
            inner.epoch += 1;
            self.shared.transition(&mut inner, ConnectionState::Connecting);
            inner.epoch
        };

        let inbound = self.shared.open(epoch).await?;
        let driver = tokio::spawn(drive(Arc::clone(&self.shared), epoch, inbound));

        let inner = self.shared.inner.lock().await;
        if inner.epoch == epoch {
            self.shared.replace_driver(Some(driver.abort_handle()));
            Ok(())
        } else {
            // left while the socket was opening
            driver.abort();
            Err(ChatError::NotConnected)
        }
    }

    /// Enter `room_id` as `member_id`.
    ///
    /// Re-checks capacity right before sending `ENTER`, then loads the room
    /// history into the log.
    ///
    /// # Errors
    ///
    /// - [`ChatError::NotConnected`] unless the session is `Open`
    /// - [`ChatError::RoomFull`] if the room has no vacancy; nothing is sent
    /// - [`ChatError::Directory`] if the capacity check itself failed
    pub async fn join(
        &self,
        room_id: impl Into<String>,
        member_id: MemberId,
    ) -> Result<(), ChatError> {
        let epoch = {
            let inner = self.shared.inner.lock().await;
            if inner.state != ConnectionState::Open {
                return Err(ChatError::NotConnected);
            }
            inner.epoch
        };
        let room = RoomContext {
            room_id: room_id.into(),
            member_id,
        };
        self.shared.enter(epoch, room).await
    }

    /// Send a chat message to the joined room.
    ///
    /// Nothing is queued: if the socket is gone the caller gets
    /// [`ChatError::NotConnected`].
    pub async fn send(&self, msg: &str) -> Result<(), ChatError> {
        let msg = validate_message(msg)?;
        let inner = self.shared.inner.lock().await;
        if inner.state != ConnectionState::Joined {
            return Err(ChatError::NotConnected);
        }
        let room = inner.room.as_ref().ok_or(ChatError::NotConnected)?;
        let frame = ChatFrame::talk(
            room.room_id.clone(),
            room.member_id,
            msg,
            self.shared.clock.now_millis(),
        );
        inner.send(&frame)
    }

    /// Leave the room and close the socket. Safe from any state.
    pub async fn leave(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.epoch += 1;
        self.shared.replace_driver(None);

        if inner.state == ConnectionState::Joined
            && let Some(room) = &inner.room
        {
            let frame = ChatFrame::close(room.room_id.clone(), room.member_id);
            if let Err(e) = inner.send(&frame) {
                tracing::debug!("CLOSE frame not sent: {}", e);
            }
            tracing::info!("Left room {}", room.room_id);
        }

        // Dropping the sender closes the socket after queued frames are flushed.
        inner.outbound = None;
        inner.room = None;
        inner.log = MessageLog::new();
        self.shared.transition(&mut inner, ConnectionState::Closed);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        // The aborted driver releases its handle on `Shared`, which closes
        // the socket even if the lock is held right now.
        self.shared.replace_driver(None);
        if let Ok(mut inner) = self.shared.inner.try_lock() {
            inner.epoch += 1;
            inner.outbound = None;
        }
    }
}

impl Shared {
    /// Abort the running driver, if any, and install `next`
    fn replace_driver(&self, next: Option<AbortHandle>) {
        let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *driver, next) {
            previous.abort();
        }
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }

    fn transition(&self, inner: &mut Inner, next: ConnectionState) {
        if inner.state != next {
            tracing::debug!("Chat session {} -> {}", inner.state, next);
            inner.state = next;
            self.emit(ChatEvent::StateChanged(next));
        }
    }

    /// Open a socket under `epoch`; on success the session is `Open`
    async fn open(&self, epoch: u64) -> Result<mpsc::UnboundedReceiver<TransportEvent>, ChatError> {
        let result = self.connector.connect(&self.url).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            // Dropping the connection closes it.
            return Err(ChatError::NotConnected);
        }
        match result {
            Ok(connection) => {
                inner.outbound = Some(connection.outbound);
                self.transition(&mut inner, ConnectionState::Open);
                Ok(connection.inbound)
            }
            Err(e) => {
                tracing::warn!("Failed to open chat socket {}: {}", self.url, e);
                self.transition(&mut inner, ConnectionState::Closed);
                Err(e)
            }
        }
    }

    /// Capacity check, `ENTER`, then history
    async fn enter(&self, epoch: u64, room: RoomContext) -> Result<(), ChatError> {
        let membership = self.directory.membership(&room.room_id).await?;
        if !membership.has_vacancy() {
            tracing::debug!(
                "Room {} is full ({}/{})",
                room.room_id,
                membership.current_count,
                membership.capacity
            );
            return Err(ChatError::RoomFull {
                room_id: room.room_id,
            });
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch || inner.state != ConnectionState::Open {
                return Err(ChatError::NotConnected);
            }
            inner.send(&ChatFrame::enter(room.room_id.clone(), room.member_id))?;
            // Rejoining the same room keeps the log so redelivered frames dedup.
            if inner.room.as_ref() != Some(&room) {
                inner.log = MessageLog::new();
            }
            inner.room = Some(room.clone());
            self.transition(&mut inner, ConnectionState::Joined);
        }
        tracing::info!("Member {} joined room {}", room.member_id, room.room_id);

        self.load_history(epoch, &room.room_id).await;
        Ok(())
    }

    async fn load_history(&self, epoch: u64, room_id: &str) {
        match self.directory.history(room_id).await {
            Ok(frames) => {
                let mut inner = self.inner.lock().await;
                if inner.epoch != epoch {
                    return;
                }
                let count = frames.len();
                for frame in frames {
                    self.ingest(&mut inner, frame);
                }
                tracing::debug!("Loaded {} history frames for room {}", count, room_id);
            }
            Err(e) => {
                tracing::warn!("Failed to load history for room {}: {}", room_id, e);
                self.emit(ChatEvent::Error(e.into()));
            }
        }
    }

    fn ingest(&self, inner: &mut Inner, frame: ChatFrame) {
        let received_at = self.clock.now_millis();
        if let Some(stored) = inner.log.ingest(frame, received_at) {
            let stored = stored.clone();
            self.emit(ChatEvent::Message(stored));
        }
    }

    /// Handle one inbound text frame
    async fn receive(&self, epoch: u64, text: &str) {
        let frame = match serde_json::from_str::<ChatFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Ignoring malformed chat frame: {}", e);
                return;
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch || inner.state != ConnectionState::Joined {
            return;
        }
        if inner
            .room
            .as_ref()
            .is_none_or(|room| room.room_id != frame.room_id)
        {
            tracing::debug!("Ignoring frame for room {}", frame.room_id);
            return;
        }
        self.ingest(&mut inner, frame);
    }

    /// Handle an unexpected close. Returns the inbound stream of a rejoined
    /// socket, or `None` when the session stays closed.
    async fn recover(
        &self,
        epoch: u64,
        reason: Option<String>,
    ) -> Option<mpsc::UnboundedReceiver<TransportEvent>> {
        let mut last_error =
            ChatError::Transport(reason.unwrap_or_else(|| "connection closed".to_string()));

        let room = {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                return None;
            }
            let room = match inner.state {
                ConnectionState::Joined => inner.room.clone(),
                _ => None,
            };
            inner.outbound = None;
            self.transition(&mut inner, ConnectionState::Closed);
            room
        };
        tracing::warn!("Chat connection lost: {}", last_error);

        // Only a joined session has a room to go back to. Otherwise the loss
        // is final and reported now; a reconnect reports only its outcome.
        let room = match room {
            Some(room) if self.policy.is_enabled() => room,
            _ => {
                self.emit(ChatEvent::Error(last_error));
                return None;
            }
        };
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        while should_attempt_reconnect(&last_error, attempt, max_attempts) {
            attempt += 1;
            self.emit(ChatEvent::Reconnecting {
                attempt,
                max_attempts,
            });
            tokio::time::sleep(backoff_delay(&self.policy, attempt)).await;

            {
                let mut inner = self.inner.lock().await;
                if inner.epoch != epoch || inner.state != ConnectionState::Closed {
                    return None;
                }
                self.transition(&mut inner, ConnectionState::Connecting);
            }

            let inbound = match self.open(epoch).await {
                Ok(inbound) => inbound,
                Err(e) => {
                    tracing::warn!("Reconnect attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_error = e;
                    continue;
                }
            };

            match self.enter(epoch, room.clone()).await {
                Ok(()) => {
                    tracing::info!("Rejoined room {} after {} attempt(s)", room.room_id, attempt);
                    return Some(inbound);
                }
                Err(e) => {
                    tracing::warn!("Rejoin attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_error = e;
                    let mut inner = self.inner.lock().await;
                    if inner.epoch != epoch {
                        return None;
                    }
                    inner.outbound = None;
                    self.transition(&mut inner, ConnectionState::Closed);
                }
            }
        }

        tracing::error!("Giving up on room {} after {} attempt(s)", room.room_id, attempt);
        self.emit(ChatEvent::Error(last_error));
        None
    }
}

/// Socket driver: applies inbound frames in arrival order and runs the
/// reconnect path when the socket closes underneath the session.
async fn drive(
    shared: Arc<Shared>,
    epoch: u64,
    mut inbound: mpsc::UnboundedReceiver<TransportEvent>,
) {
    loop {
        let reason = pump(&shared, epoch, &mut inbound).await;
        match shared.recover(epoch, reason).await {
            Some(next) => inbound = next,
            None => return,
        }
    }
}

async fn pump(
    shared: &Shared,
    epoch: u64,
    inbound: &mut mpsc::UnboundedReceiver<TransportEvent>,
) -> Option<String> {
    while let Some(event) = inbound.recv().await {
        match event {
            TransportEvent::Text(text) => shared.receive(epoch, &text).await,
            TransportEvent::Closed(reason) => return reason,
        }
    }
    None
}
