//! The gateway actor.
//!
//! A single task owns the [`Relay`] and the outbox of every live connection.
//! Commands are handled one at a time and each handler is synchronous, so
//! every registry mutation and the broadcast it triggers happen without
//! interleaving with other commands.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;

use domain::models::{
    Alert, AlertKind, AlertSnapshot, ConnectionId, ResolveAlertRequest, StartTrackingResponse,
    StatusResponse,
};
use domain::services::Relay;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::protocol::{ClientEvent, ClientFrame, Empty, ServerEvent};
use crate::middleware::metrics as relay_metrics;

pub(crate) type Outbox = mpsc::UnboundedSender<ServerEvent>;

pub(crate) enum Command {
    Connect {
        connection_id: ConnectionId,
        outbox: Outbox,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Client {
        connection_id: ConnectionId,
        frame: ClientFrame,
    },
    SubmitAlert {
        alert: Alert,
        reply: oneshot::Sender<Value>,
    },
    ResolveAlert {
        request: ResolveAlertRequest,
        reply: oneshot::Sender<()>,
    },
    ClearAlerts {
        reply: oneshot::Sender<()>,
    },
    Alerts {
        reply: oneshot::Sender<AlertSnapshot>,
    },
    AlertsOfKind {
        kind: AlertKind,
        reply: oneshot::Sender<Vec<Alert>>,
    },
    Status {
        reply: oneshot::Sender<GatewayStatus>,
    },
}

/// Point-in-time counters for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatewayStatus {
    pub uptime_secs: u64,
    pub alert_count: usize,
    pub connections: usize,
    pub identified_officers: usize,
    pub tracking_sessions: usize,
}

pub(crate) struct GatewayActor {
    relay: Relay,
    outboxes: HashMap<ConnectionId, Outbox>,
    started_at: Instant,
    commands: mpsc::Receiver<Command>,
}

impl GatewayActor {
    pub(crate) fn new(commands: mpsc::Receiver<Command>) -> Self {
        Self {
            relay: Relay::new(),
            outboxes: HashMap::new(),
            started_at: Instant::now(),
            commands,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Gateway started");
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        info!(
            connections = self.outboxes.len(),
            "Gateway stopped: all handles dropped"
        );
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Connect {
                connection_id,
                outbox,
            } => {
                self.outboxes.insert(connection_id, outbox);
                info!(connection_id = %connection_id, "Client connected");
                self.record_gauges();
            }
            Command::Disconnect { connection_id } => self.disconnect(connection_id),
            Command::Client {
                connection_id,
                frame,
            } => self.client_event(connection_id, frame),
            Command::SubmitAlert { alert, reply } => {
                let submitted = self.relay.submit_alert(alert);
                relay_metrics::record_alert_submitted(submitted.kind);
                match submitted.kind {
                    Some(kind) => {
                        info!(alert_id = %submitted.id, alert_type = %kind, "Alert received");
                        self.broadcast(ServerEvent::new_alert(kind, submitted.alert));
                    }
                    None => {
                        debug!(alert_id = %submitted.id, "Alert with unrecognized type acknowledged, not stored");
                    }
                }
                let _ = reply.send(submitted.id);
            }
            Command::ResolveAlert { request, reply } => {
                if let Some(outcome) = self.relay.resolve_alert(&request) {
                    relay_metrics::record_alert_resolved(outcome.kind);
                    info!(
                        alert_id = ?outcome.id,
                        alert_type = %outcome.kind,
                        removed = outcome.removed,
                        "Alert resolved"
                    );
                    self.broadcast(ServerEvent::resolved(outcome.kind, outcome.id));
                }
                let _ = reply.send(());
            }
            Command::ClearAlerts { reply } => {
                let dropped = self.relay.clear_alerts();
                info!(dropped, "All alerts cleared");
                self.broadcast(ServerEvent::AlertsCleared(Empty {}));
                let _ = reply.send(());
            }
            Command::Alerts { reply } => {
                let _ = reply.send(self.relay.alerts().snapshot());
            }
            Command::AlertsOfKind { kind, reply } => {
                let _ = reply.send(self.relay.alerts().list(kind).to_vec());
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn client_event(&mut self, connection_id: ConnectionId, frame: ClientFrame) {
        if !self.outboxes.contains_key(&connection_id) {
            debug!(connection_id = %connection_id, "Event from closed connection dropped");
            return;
        }
        debug!(connection_id = %connection_id, event = frame.event.name(), "Client event");

        match frame.event {
            ClientEvent::OfficerLogin(login) => {
                let snapshot = self.relay.login(connection_id, login);
                info!(
                    connection_id = %connection_id,
                    officer = %self.officer_name(connection_id),
                    "Officer logged in"
                );
                self.send_to(
                    connection_id,
                    ServerEvent::all_alerts(AlertKind::Camera, snapshot.camera),
                );
                self.send_to(
                    connection_id,
                    ServerEvent::all_alerts(AlertKind::Sos, snapshot.sos),
                );
                self.record_gauges();
                self.ack(connection_id, frame.ack, Value::Null);
            }
            ClientEvent::UpdateLocation(location) => {
                for update in self.relay.update_location(connection_id, location) {
                    self.send_to(connection_id, ServerEvent::TrackingUpdate(update));
                }
                self.ack(connection_id, frame.ack, Value::Null);
            }
            ClientEvent::StartTracking(request) => {
                let alert_id = request.alert_id.clone();
                let tracking_id = match self.relay.start_tracking(connection_id, request) {
                    Some(update) => {
                        let tracking_id = update.tracking_id;
                        relay_metrics::record_tracking_started();
                        info!(
                            connection_id = %connection_id,
                            tracking_id = %tracking_id,
                            alert_id = ?alert_id,
                            officer = %self.officer_name(connection_id),
                            "Tracking started"
                        );
                        self.send_to(connection_id, ServerEvent::TrackingUpdate(update));
                        Some(tracking_id)
                    }
                    None => None,
                };
                self.ack(
                    connection_id,
                    frame.ack,
                    StartTrackingResponse { tracking_id },
                );
            }
            ClientEvent::StopTracking => {
                let stopped = self.relay.stop_tracking(connection_id);
                info!(
                    connection_id = %connection_id,
                    stopped,
                    officer = %self.officer_name(connection_id),
                    "Tracking stopped"
                );
                self.ack(connection_id, frame.ack, StatusResponse::success());
            }
        }
    }

    fn disconnect(&mut self, connection_id: ConnectionId) {
        self.outboxes.remove(&connection_id);
        let removed = self.relay.remove_connection(connection_id);
        info!(
            connection_id = %connection_id,
            officer = ?removed.officer.as_ref().map(|o| o.display_name()),
            tracking_sessions = removed.tracking_sessions,
            "Client disconnected"
        );
        self.record_gauges();
    }

    fn officer_name(&self, connection_id: ConnectionId) -> Cow<'_, str> {
        self.relay
            .officers()
            .get(&connection_id)
            .map(|o| o.display_name())
            .unwrap_or(Cow::Borrowed("Unknown"))
    }

    fn ack(&self, connection_id: ConnectionId, ack: Option<u64>, data: impl Serialize) {
        if let Some(id) = ack {
            self.send_to(connection_id, ServerEvent::ack(id, data));
        }
    }

    fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) {
        if let Some(outbox) = self.outboxes.get(&connection_id) {
            if outbox.send(event).is_err() {
                warn!(connection_id = %connection_id, "Failed to deliver event, receiver gone");
            }
        }
    }

    fn broadcast(&self, event: ServerEvent) {
        debug!(
            event = event.name(),
            client_count = self.outboxes.len(),
            "Broadcasting event"
        );
        for (connection_id, outbox) in &self.outboxes {
            if outbox.send(event.clone()).is_err() {
                warn!(connection_id = %connection_id, "Failed to deliver broadcast, receiver gone");
            }
        }
    }

    fn status(&self) -> GatewayStatus {
        GatewayStatus {
            uptime_secs: self.started_at.elapsed().as_secs(),
            alert_count: self.relay.alerts().len(),
            connections: self.outboxes.len(),
            identified_officers: self.relay.officers().len(),
            tracking_sessions: self.relay.tracking().len(),
        }
    }

    fn record_gauges(&self) {
        relay_metrics::record_gateway_connections(self.outboxes.len());
        relay_metrics::record_officers_identified(self.relay.officers().len());
    }
}
