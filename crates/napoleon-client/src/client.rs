//! `NapoleonClient`: the async shell around store and transport.
//!
//! Two background tasks do all the work. The reader pulls frames off
//! the connection and folds them into the [`SessionStore`]; the writer
//! drains a command queue onto the connection. The handle itself only
//! hands out state snapshots and queues commands.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use napoleon_protocol::{Bid, Card, ClientCommand, RoomKey, Suit};
use napoleon_session::ClientState;
use napoleon_transport::{FrameConnection, WebSocketConnection};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::ClientError;
use crate::store::SessionStore;

/// Handle to a running client.
///
/// Commands are fire-and-forget: queueing one never waits on the
/// network and nothing pairs a command with a response. Whatever the
/// server decides arrives later as ordinary inbound events, the same
/// shape as events caused by every other player.
pub struct NapoleonClient<C: FrameConnection> {
    conn: Arc<C>,
    commands: mpsc::UnboundedSender<String>,
    state_rx: watch::Receiver<ClientState>,
    decode_failures: Arc<AtomicU64>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl NapoleonClient<WebSocketConnection> {
    /// Connects over WebSocket and starts the pump tasks.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let conn = WebSocketConnection::connect(url).await?;
        Ok(Self::start(conn))
    }
}

impl<C: FrameConnection> NapoleonClient<C> {
    /// Starts the pump tasks over an already-established connection.
    pub fn start(conn: C) -> Self {
        let conn = Arc::new(conn);
        let mut store = SessionStore::new();
        let state_rx = store.subscribe();
        let decode_failures = Arc::new(AtomicU64::new(0));

        // Reader: the single writer of state. Each frame is fully
        // folded before the next is read, so events never interleave.
        let reader = {
            let conn = Arc::clone(&conn);
            let failures = Arc::clone(&decode_failures);
            tokio::spawn(async move {
                loop {
                    match conn.recv().await {
                        Ok(Some(frame)) => {
                            store.handle_frame(&frame);
                            failures.store(
                                store.decode_failures(),
                                Ordering::Relaxed,
                            );
                        }
                        Ok(None) => {
                            tracing::info!("server closed the connection");
                            break;
                        }
                        Err(error) => {
                            tracing::warn!(%error, "receive failed");
                            break;
                        }
                    }
                }
            })
        };

        let (commands, mut queued) = mpsc::unbounded_channel::<String>();
        let writer = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move {
                while let Some(frame) = queued.recv().await {
                    if let Err(error) = conn.send(&frame).await {
                        tracing::warn!(%error, "send failed");
                        break;
                    }
                }
            })
        };

        Self {
            conn,
            commands,
            state_rx,
            decode_failures,
            reader,
            writer,
        }
    }

    // -- state ------------------------------------------------------------

    /// A snapshot of the current state.
    pub fn state(&self) -> ClientState {
        self.state_rx.borrow().clone()
    }

    /// A receiver notified on every state version the reducer produces.
    ///
    /// Backed by `watch`: only the latest version is retained, so a
    /// slow consumer skips intermediate versions rather than falling
    /// behind.
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.state_rx.clone()
    }

    /// Inbound frames dropped as undecodable so far on this connection.
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    // -- commands ---------------------------------------------------------

    /// Asks the server for a fresh room with us as host.
    pub fn create_room(&self, username: &str) -> Result<(), ClientError> {
        self.send(ClientCommand::CreateRoom {
            username: username.to_string(),
        })
    }

    /// Joins an existing room by key.
    pub fn join_room(&self, username: &str, key: RoomKey) -> Result<(), ClientError> {
        self.send(ClientCommand::JoinRoom {
            username: username.to_string(),
            key,
        })
    }

    /// Starts the game. The server only honours this from the host.
    pub fn start_game(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::StartGame)
    }

    /// Bids `amount` tricks, or skips when `amount` is `None`.
    ///
    /// Zero is a real bid, distinct from skipping.
    pub fn bid(&self, amount: Option<usize>) -> Result<(), ClientError> {
        let bid = match amount {
            Some(amount) => Bid::Numeric(amount),
            None => Bid::Skipped,
        };
        self.send(ClientCommand::Bid(bid))
    }

    /// Announces trump and the ally cards. Only meaningful from the
    /// napoleon; the caller is expected to pass the full ally set.
    pub fn pick_allies(
        &self,
        trump_suit: Suit,
        allies: Vec<Card>,
    ) -> Result<(), ClientError> {
        self.send(ClientCommand::PickAllies { trump_suit, allies })
    }

    /// Plays one card from our hand.
    pub fn play_card(&self, card: Card) -> Result<(), ClientError> {
        self.send(ClientCommand::PlayCard(card))
    }

    fn send(&self, command: ClientCommand) -> Result<(), ClientError> {
        let frame = command.encode();
        tracing::debug!(%frame, "queueing command");
        self.commands
            .send(frame)
            .map_err(|_| ClientError::ConnectionClosed)
    }

    // -- lifecycle --------------------------------------------------------

    /// Closes the connection and waits for both pump tasks to stop.
    ///
    /// Queued commands are drained before the writer exits. The reader
    /// is aborted last; it may be parked waiting for a close reply a
    /// misbehaving server never sends.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.writer.await;
        if let Err(error) = self.conn.close().await {
            tracing::debug!(%error, "close failed");
        }
        self.reader.abort();
        let _ = self.reader.await;
    }
}
