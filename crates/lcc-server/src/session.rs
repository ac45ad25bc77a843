//! The capture session actor.
//!
//! One task owns the [`Aggregator`] and applies commands in arrival order, so
//! every ingest, query and export sees a consistent session without locks.
//! Handlers talk to it through a cloneable [`SessionHandle`].

use lcc_core::{raw, Aggregator, CaptureEvent, CapturedResponse, PgnExport, RawFile, Route};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Commands queued before senders start waiting.
const COMMAND_BUFFER: usize = 256;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("Capture session is not running")]
    Closed,
}

/// Captured payloads as reported by `GET /api/captures`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedSnapshot {
    pub count: usize,
    /// `[url, entry]` pairs in capture order.
    pub data: Vec<(String, CapturedResponse)>,
}

impl CapturedSnapshot {
    fn of(aggregator: &Aggregator) -> Self {
        Self {
            count: aggregator.captured_count(),
            data: aggregator
                .captured_entries()
                .map(|(url, entry)| (url.to_string(), entry.clone()))
                .collect(),
        }
    }
}

/// A request to the session task, carrying the channel for its answer.
pub enum SessionCommand {
    Ingest {
        event: CaptureEvent,
        reply: oneshot::Sender<Route>,
    },
    Captured {
        reply: oneshot::Sender<CapturedSnapshot>,
    },
    ExportPgn {
        reply: oneshot::Sender<Option<PgnExport>>,
    },
    ExportRaw {
        reply: oneshot::Sender<Vec<RawFile>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to the session task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Starts a session task with an empty aggregator.
    ///
    /// Must be called from within a Tokio runtime. The task ends once every
    /// handle has been dropped.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run(Aggregator::new(), rx));
        Self { tx }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn ingest(&self, event: CaptureEvent) -> Result<Route, SessionError> {
        self.request(|reply| SessionCommand::Ingest { event, reply })
            .await
    }

    pub async fn captured(&self) -> Result<CapturedSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Captured { reply }).await
    }

    /// The merged PGN, or `None` while no game has been captured.
    pub async fn export_pgn(&self) -> Result<Option<PgnExport>, SessionError> {
        self.request(|reply| SessionCommand::ExportPgn { reply }).await
    }

    pub async fn export_raw(&self) -> Result<Vec<RawFile>, SessionError> {
        self.request(|reply| SessionCommand::ExportRaw { reply }).await
    }

    /// Drops everything captured so far.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Reset { reply }).await
    }
}

async fn run(mut aggregator: Aggregator, mut rx: mpsc::Receiver<SessionCommand>) {
    while let Some(command) = rx.recv().await {
        // A dropped receiver only means the requester went away.
        match command {
            SessionCommand::Ingest { event, reply } => {
                let _ = reply.send(aggregator.ingest_event(event));
            }
            SessionCommand::Captured { reply } => {
                let _ = reply.send(CapturedSnapshot::of(&aggregator));
            }
            SessionCommand::ExportPgn { reply } => {
                let _ = reply.send(PgnExport::from_aggregator(&aggregator));
            }
            SessionCommand::ExportRaw { reply } => {
                let _ = reply.send(raw::export(&aggregator));
            }
            SessionCommand::Reset { reply } => {
                tracing::info!(
                    captured = aggregator.captured_count(),
                    "Resetting capture session"
                );
                aggregator.clear();
                let _ = reply.send(());
            }
        }
    }
    tracing::debug!("Capture session stopped");
}
