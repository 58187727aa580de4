use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::message::{RemoteState, ServerMessage};

/// Handle to the live telemetry stream.
///
/// `connect` spawns a task that exclusively owns the transport and the
/// reconnect timer; the handle only observes, through watch channels. The
/// task keeps the connection alive indefinitely: a drop schedules exactly one
/// reconnect after the configured delay and the cycle repeats, until
/// `teardown` (or dropping the handle) stops it.
pub struct StreamClient {
    state: watch::Receiver<RemoteState>,
    connected: watch::Receiver<bool>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl StreamClient {
    pub fn connect(config: StreamConfig) -> Self {
        let (state_tx, state) = watch::channel(RemoteState::default());
        let (connected_tx, connected) = watch::channel(false);
        let (shutdown, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(config, state_tx, connected_tx, shutdown_rx));

        Self {
            state,
            connected,
            shutdown,
            task,
        }
    }

    /// Merged remote state. Borrow for the current value, `changed().await`
    /// to follow it.
    pub fn state(&self) -> watch::Receiver<RemoteState> {
        self.state.clone()
    }

    /// True while a connection is open and has not errored or closed.
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Cancels a pending reconnect, drops the transport and waits for the
    /// task to finish. Nothing mutates the published state afterwards.
    pub async fn teardown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

enum Disconnect {
    Shutdown,
    Eof,
    Io(io::Error),
}

async fn run(
    config: StreamConfig,
    state: watch::Sender<RemoteState>,
    connected: watch::Sender<bool>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let delay = Duration::from_millis(config.reconnect_delay_ms);

    loop {
        // The previous transport is gone before a new connect starts, so two
        // connections can never feed RemoteState at the same time.
        let attempt = tokio::select! {
            _ = &mut shutdown => return,
            attempt = TcpStream::connect(config.addr.as_str()) => attempt,
        };

        match attempt {
            Ok(stream) => {
                info!(addr = %config.addr, "Connected to controller gateway");
                connected.send_replace(true);

                let reason = read_frames(stream, &state, &mut shutdown).await;
                connected.send_replace(false);

                match reason {
                    Disconnect::Shutdown => return,
                    Disconnect::Eof => info!("Gateway closed the connection"),
                    Disconnect::Io(e) => warn!("Connection lost: {e}"),
                }
            }
            Err(e) => debug!(addr = %config.addr, "Connect failed: {e}"),
        }

        // At most one reconnect is pending at a time; teardown cancels it.
        tokio::select! {
            _ = &mut shutdown => return,
            _ = sleep(delay) => {}
        }
    }
}

async fn read_frames(
    stream: TcpStream,
    state: &watch::Sender<RemoteState>,
    shutdown: &mut oneshot::Receiver<()>,
) -> Disconnect {
    let mut lines = BufReader::new(stream).lines();

    loop {
        tokio::select! {
            _ = &mut *shutdown => return Disconnect::Shutdown,
            line = lines.next_line() => match line {
                Ok(Some(line)) => apply_frame(state, &line),
                Ok(None) => return Disconnect::Eof,
                Err(e) => return Disconnect::Io(e),
            },
        }
    }
}

/// Frames are applied in receipt order. A frame that does not parse is
/// dropped with a warning; one corrupt line must not take the stream down.
fn apply_frame(state: &watch::Sender<RemoteState>, line: &str) {
    match serde_json::from_str::<ServerMessage>(line) {
        Ok(ServerMessage {
            snapshot: None,
            update: None,
        }) => {}
        Ok(message) => state.send_modify(|s| s.apply(message)),
        Err(e) => warn!("Dropping malformed frame: {e}"),
    }
}
