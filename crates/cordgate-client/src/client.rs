//! Public client handle.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use cordgate_core::error::{GatewayError, Result};
use cordgate_core::protocol::{Envelope, OpCode};

use crate::config::ClientConfig;
use crate::dispatch::{Deregistration, HandlerRegistry, HandlerResult};
use crate::session::driver::Driver;
use crate::session::{ReconnectBackoff, SessionMachine, SessionSnapshot, SessionState};
use crate::transport::TransportFactory;

/// A running gateway session.
///
/// Created by [`GatewayClient::connect`], which spawns the session task on the
/// current tokio runtime. The session keeps reconnecting until [`close`] is
/// called (or the handle is dropped), unless `reconnect` is disabled.
///
/// [`close`]: GatewayClient::close
pub struct GatewayClient {
    registry: HandlerRegistry,
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<SessionSnapshot>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl GatewayClient {
    /// Validate `config` and start connecting. Fails with `InvalidConfiguration`
    /// before any transport is opened.
    pub fn connect(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Result<Self> {
        Self::connect_with_registry(config, factory, HandlerRegistry::new())
    }

    /// Like [`GatewayClient::connect`], with handlers registered up front so
    /// none of the first frames can be missed.
    pub fn connect_with_registry(
        config: ClientConfig,
        factory: Arc<dyn TransportFactory>,
        registry: HandlerRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let identify = config.identify()?;
        let machine = SessionMachine::new(&identify, config.gateway.url.clone())?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            GatewayError::InvalidConfiguration("connect must be called inside a tokio runtime".into())
        })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(machine.snapshot());

        let driver = Driver::new(
            machine,
            factory,
            registry.clone(),
            ReconnectBackoff::new(config.backoff_policy()),
            config.gateway.reconnect,
            shutdown_rx,
            status_tx,
        );
        tracing::info!(intents = %identify.intents, reconnect = config.gateway.reconnect, "gateway client starting");
        let task = runtime.spawn(driver.run());

        Ok(Self {
            registry,
            shutdown: shutdown_tx,
            status: status_rx,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn on_op_code<F>(&self, op: OpCode, handler: F) -> Deregistration
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.on_op_code(op, handler)
    }

    pub fn on_event<F>(&self, event: impl Into<String>, handler: F) -> Deregistration
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.on_event(event, handler)
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.status.borrow().clone()
    }

    /// Receiver that observes every published state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionSnapshot> {
        self.status.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.status.borrow().state == SessionState::Closed
    }

    /// Shut the session down: cancel any backoff wait, stop heartbeating and
    /// close the transport with a normal closure. Returns once the session task
    /// has exited, so no handler runs after this. Idempotent.
    pub async fn close(&self) {
        self.shutdown.send_replace(true);
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "session task ended abnormally");
            }
        }
    }
}
