//! Event gateway.
//!
//! Owns all relay state inside one actor task and fans events out to live
//! WebSocket connections. Everything else (HTTP handlers, socket sessions)
//! talks to it through a cloneable [`GatewayHandle`].

mod actor;
pub mod protocol;

use domain::models::{Alert, AlertKind, AlertSnapshot, ConnectionId, ResolveAlertRequest};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

pub use actor::GatewayStatus;
pub use protocol::{ClientEvent, ClientFrame, ProtocolError, ServerEvent};

use actor::{Command, GatewayActor};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway is not running")]
    Closed,

    #[error("Gateway dropped the reply")]
    NoReply,
}

/// A registered connection and the stream of events addressed to it.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
}

#[derive(Debug, Clone)]
pub struct GatewayHandle {
    commands: mpsc::Sender<Command>,
}

impl GatewayHandle {
    /// Spawns the gateway actor on the current Tokio runtime.
    ///
    /// The actor stops once every handle has been dropped.
    pub fn spawn(command_buffer: usize) -> Self {
        let (tx, rx) = mpsc::channel(command_buffer);
        tokio::spawn(GatewayActor::new(rx).run());
        Self { commands: tx }
    }

    /// Registers a new connection. It receives broadcasts immediately but
    /// stays unidentified until it sends `officer_login`.
    pub async fn connect(&self) -> Result<Connection, GatewayError> {
        let id = Uuid::new_v4();
        let (outbox, events) = mpsc::unbounded_channel();
        self.send(Command::Connect {
            connection_id: id,
            outbox,
        })
        .await?;
        Ok(Connection { id, events })
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), GatewayError> {
        self.send(Command::Disconnect { connection_id }).await
    }

    /// Hands an inbound client frame to the actor.
    pub async fn dispatch(
        &self,
        connection_id: ConnectionId,
        frame: ClientFrame,
    ) -> Result<(), GatewayError> {
        self.send(Command::Client {
            connection_id,
            frame,
        })
        .await
    }

    /// Stores the alert, broadcasts it, and returns its identifier.
    pub async fn submit_alert(&self, alert: Alert) -> Result<Value, GatewayError> {
        self.request(|reply| Command::SubmitAlert { alert, reply })
            .await
    }

    pub async fn resolve_alert(&self, request: ResolveAlertRequest) -> Result<(), GatewayError> {
        self.request(|reply| Command::ResolveAlert { request, reply })
            .await
    }

    pub async fn clear_alerts(&self) -> Result<(), GatewayError> {
        self.request(|reply| Command::ClearAlerts { reply }).await
    }

    pub async fn alerts(&self) -> Result<AlertSnapshot, GatewayError> {
        self.request(|reply| Command::Alerts { reply }).await
    }

    pub async fn alerts_of_kind(&self, kind: AlertKind) -> Result<Vec<Alert>, GatewayError> {
        self.request(|reply| Command::AlertsOfKind { kind, reply })
            .await
    }

    pub async fn status(&self) -> Result<GatewayStatus, GatewayError> {
        self.request(|reply| Command::Status { reply }).await
    }

    async fn send(&self, command: Command) -> Result<(), GatewayError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GatewayError::Closed)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, GatewayError> {
        let (reply, response) = oneshot::channel();
        self.send(make(reply)).await?;
        response.await.map_err(|_| GatewayError::NoReply)
    }
}
