//! Async session driver.
//!
//! One task per client. Inbound frames, the heartbeat deadline, the reconnect
//! backoff and shutdown are arms of the same `select!`, so session state is
//! only ever touched from this task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::Instrument;

use cordgate_core::protocol::envelope;
use cordgate_core::protocol::CloseCode;

use crate::dispatch::HandlerRegistry;
use crate::session::backoff::ReconnectBackoff;
use crate::session::machine::{Action, SessionMachine, SessionSnapshot, SessionState};
use crate::transport::{Transport, TransportEvent, TransportFactory};

/// Why a connection ended.
enum Exit {
    Shutdown,
    Lost,
}

pub(crate) struct Driver {
    machine: SessionMachine,
    factory: Arc<dyn TransportFactory>,
    registry: HandlerRegistry,
    backoff: ReconnectBackoff,
    reconnect: bool,
    shutdown: watch::Receiver<bool>,
    status: watch::Sender<SessionSnapshot>,
}

impl Driver {
    pub(crate) fn new(
        machine: SessionMachine,
        factory: Arc<dyn TransportFactory>,
        registry: HandlerRegistry,
        backoff: ReconnectBackoff,
        reconnect: bool,
        shutdown: watch::Receiver<bool>,
        status: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            machine,
            factory,
            registry,
            backoff,
            reconnect,
            shutdown,
            status,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            self.machine.begin_connect();
            self.publish();

            let url = self.machine.connect_url();
            let span = tracing::info_span!("gateway_connection", attempt = self.backoff.attempt());

            let opened = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                r = self.factory.open(&url).instrument(span.clone()) => r,
            };

            let exit = match opened {
                Ok(transport) => self.drive(transport).instrument(span).await,
                Err(e) => {
                    self.machine.on_transport_error(&e.to_string());
                    Exit::Lost
                }
            };
            if let Exit::Shutdown = exit {
                break;
            }
            self.publish();

            if !self.reconnect {
                tracing::info!("connection lost and reconnect is disabled, closing");
                break;
            }

            let delay = self.backoff.next_delay();
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.attempt(),
                cursor = ?self.machine.resume_cursor(),
                "reconnecting after backoff"
            );
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                _ = sleep(delay) => {}
            }
        }

        self.machine.close();
        self.publish();
        tracing::info!("session closed");
    }

    async fn drive(&mut self, mut transport: Box<dyn Transport>) -> Exit {
        loop {
            let deadline = self.machine.heartbeat_deadline();

            let actions = tokio::select! {
                biased;
                _ = self.shutdown.changed() => {
                    self.machine.close();
                    if let Err(e) = transport.close(CloseCode::NORMAL.0, "client shutdown").await {
                        tracing::debug!(error = %e, "transport close failed");
                    }
                    return Exit::Shutdown;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.machine.on_heartbeat_due(Instant::now())
                }
                event = transport.next_event() => self.on_event(event),
            };

            for action in actions {
                match action {
                    Action::Send(env) => {
                        tracing::trace!(op = %env.op(), "send");
                        if let Err(e) = transport.send(envelope::encode(&env)).await {
                            self.machine.on_transport_error(&e.to_string());
                            if let Err(e) = transport.close(CloseCode::UNKNOWN_ERROR.0, "send failed").await {
                                tracing::debug!(error = %e, "transport close failed");
                            }
                            return Exit::Lost;
                        }
                    }
                    Action::Forward(env) => self.registry.forward(&env),
                    Action::Disconnect { code, reason } => {
                        tracing::info!(code, reason, "closing connection");
                        if let Err(e) = transport.close(code, reason).await {
                            tracing::debug!(error = %e, "transport close failed");
                        }
                        return Exit::Lost;
                    }
                }
            }

            match self.machine.state() {
                SessionState::Ready => self.backoff.reset(),
                SessionState::Reconnecting => return Exit::Lost,
                _ => {}
            }
            self.publish();
        }
    }

    fn on_event(&mut self, event: TransportEvent) -> Vec<Action> {
        match event {
            TransportEvent::Open => {
                self.machine.on_open();
                Vec::new()
            }
            TransportEvent::Message(text) => self.machine.on_frame(&text, Instant::now()),
            TransportEvent::Close { code, reason } => {
                self.machine.on_transport_closed(code, &reason);
                Vec::new()
            }
            TransportEvent::Error(e) => {
                self.machine.on_transport_error(&e);
                Vec::new()
            }
        }
    }

    fn publish(&self) {
        self.status.send_replace(self.machine.snapshot());
    }
}
