//! Session state machine.
//!
//! `Connecting -> AwaitingHello -> Identifying|Resuming -> Ready -> Reconnecting -> Connecting ...`,
//! with `Closed` reachable from anywhere and terminal.
//!
//! The machine performs no IO. Every input returns a list of [`Action`]s that
//! the driver executes in order, which keeps the transitions testable without
//! a socket or a runtime.

use std::fmt;

use serde_json::Value;
use tokio::time::{Duration, Instant};

use cordgate_core::error::{GatewayError, Result};
use cordgate_core::protocol::envelope::{self, Envelope, Identify, Resume};
use cordgate_core::protocol::{event, CloseCode, OpCode};

use crate::heartbeat::{Beat, HeartbeatScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Connecting,
    AwaitingHello,
    Identifying,
    Resuming,
    Ready,
    Reconnecting,
    Closed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Connecting => "connecting",
            SessionState::AwaitingHello => "awaiting_hello",
            SessionState::Identifying => "identifying",
            SessionState::Resuming => "resuming",
            SessionState::Ready => "ready",
            SessionState::Reconnecting => "reconnecting",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work for the driver, executed in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Encode and send on the current transport.
    Send(Envelope),
    /// Hand to the handler registry (op-code handlers, then event handlers).
    Forward(Envelope),
    /// Close the current transport with `code` and go through backoff.
    Disconnect { code: u16, reason: &'static str },
}

/// Observable view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub resume_cursor: Option<u64>,
    pub session_id: Option<String>,
}

pub struct SessionMachine {
    state: SessionState,
    identify: Envelope,
    token: String,
    base_url: String,
    resume_cursor: Option<u64>,
    session_id: Option<String>,
    resume_url: Option<String>,
    heartbeat: HeartbeatScheduler,
}

impl SessionMachine {
    pub fn new(identify: &Identify, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            state: SessionState::Connecting,
            identify: Envelope::identify(identify)?,
            token: identify.token.clone(),
            base_url: base_url.into(),
            resume_cursor: None,
            session_id: None,
            resume_url: None,
            heartbeat: HeartbeatScheduler::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn resume_cursor(&self) -> Option<u64> {
        self.resume_cursor
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn heartbeat(&self) -> &HeartbeatScheduler {
        &self.heartbeat
    }

    pub fn heartbeat_deadline(&self) -> Option<Instant> {
        self.heartbeat.deadline()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            resume_cursor: self.resume_cursor,
            session_id: self.session_id.clone(),
        }
    }

    fn can_resume(&self) -> bool {
        self.resume_cursor.is_some() && self.session_id.is_some()
    }

    /// URL for the next connection: the server-provided resume URL while a
    /// resumable session exists, the configured URL otherwise.
    pub fn connect_url(&self) -> String {
        match (&self.resume_url, self.can_resume()) {
            (Some(url), true) => resume_url_with_query(url, &self.base_url),
            _ => self.base_url.clone(),
        }
    }

    pub fn begin_connect(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.transition(SessionState::Connecting);
    }

    pub fn on_open(&mut self) {
        if self.state == SessionState::Connecting {
            self.transition(SessionState::AwaitingHello);
        } else {
            tracing::debug!(state = %self.state, "ignoring transport open");
        }
    }

    /// Decode and process one inbound text frame. Malformed frames are logged and dropped.
    pub fn on_frame(&mut self, raw: &str, now: Instant) -> Vec<Action> {
        match envelope::decode(raw) {
            Ok(env) => self.on_envelope(env, now),
            Err(e) => {
                tracing::warn!(error = %e, len = raw.len(), "dropping frame");
                Vec::new()
            }
        }
    }

    pub fn on_envelope(&mut self, env: Envelope, now: Instant) -> Vec<Action> {
        match self.state {
            SessionState::Reconnecting | SessionState::Closed => {
                tracing::debug!(state = %self.state, op = %env.op(), "ignoring envelope on a dead connection");
                return Vec::new();
            }
            SessionState::Connecting => self.on_open(),
            _ => {}
        }
        tracing::trace!(op = %env.op(), seq = ?env.seq(), event = ?env.event(), "recv");

        match env.op() {
            OpCode::HELLO => self.on_hello(env, now),
            OpCode::DISPATCH => self.on_dispatch(env),
            OpCode::HEARTBEAT_ACK => {
                self.heartbeat.acknowledge();
                vec![Action::Forward(env)]
            }
            OpCode::HEARTBEAT => {
                // server-requested beat; the regular schedule is left alone
                vec![
                    Action::Send(Envelope::heartbeat(self.resume_cursor)),
                    Action::Forward(env),
                ]
            }
            OpCode::RECONNECT => {
                let mut actions = vec![Action::Forward(env)];
                actions.push(self.fail(true, "server requested reconnect"));
                actions
            }
            OpCode::INVALID_SESSION => {
                let resumable = env.data().as_bool().unwrap_or(false);
                let mut actions = vec![Action::Forward(env)];
                actions.push(self.fail(resumable, "session invalidated"));
                actions
            }
            _ => vec![Action::Forward(env)],
        }
    }

    fn on_hello(&mut self, env: Envelope, now: Instant) -> Vec<Action> {
        if self.state != SessionState::AwaitingHello {
            return vec![self.violation(format!("hello received in state {}", self.state))];
        }
        let Some(interval_ms) = env
            .data()
            .get("heartbeat_interval")
            .and_then(Value::as_u64)
            .filter(|ms| *ms > 0)
        else {
            return vec![self.violation("hello without a usable heartbeat_interval".into())];
        };

        self.heartbeat.start(Duration::from_millis(interval_ms), now);

        let handshake = match (self.resume_cursor, self.session_id.clone()) {
            (Some(seq), Some(session_id)) => {
                let resume = Resume {
                    token: self.token.clone(),
                    session_id,
                    seq,
                };
                match Envelope::resume(&resume) {
                    Ok(env) => {
                        tracing::info!(seq, interval_ms, "hello: resuming session");
                        self.transition(SessionState::Resuming);
                        env
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "resume payload rejected, identifying instead");
                        self.start_fresh(interval_ms)
                    }
                }
            }
            _ => self.start_fresh(interval_ms),
        };

        vec![Action::Send(handshake), Action::Forward(env)]
    }

    fn start_fresh(&mut self, interval_ms: u64) -> Envelope {
        self.clear_session();
        tracing::info!(interval_ms, "hello: identifying");
        self.transition(SessionState::Identifying);
        self.identify.clone()
    }

    fn on_dispatch(&mut self, env: Envelope) -> Vec<Action> {
        match self.state {
            SessionState::Identifying if env.event() == Some(event::READY) => {
                self.session_id = env
                    .data()
                    .get("session_id")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                self.resume_url = env
                    .data()
                    .get("resume_gateway_url")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                tracing::info!(session_id = ?self.session_id, "session ready");
                self.transition(SessionState::Ready);
            }
            SessionState::Identifying => {
                return vec![self.violation(format!(
                    "dispatch {} before READY",
                    env.event().unwrap_or_default()
                ))];
            }
            SessionState::Resuming => {
                tracing::info!(event = ?env.event(), "session resumed");
                self.transition(SessionState::Ready);
            }
            SessionState::Ready => {}
            _ => {
                return vec![self.violation(format!("dispatch received in state {}", self.state))];
            }
        }

        if let Some(seq) = env.seq() {
            self.resume_cursor = Some(self.resume_cursor.map_or(seq, |c| c.max(seq)));
        }
        vec![Action::Forward(env)]
    }

    /// Heartbeat deadline reached.
    pub fn on_heartbeat_due(&mut self, now: Instant) -> Vec<Action> {
        match self.heartbeat.fire(now, self.resume_cursor) {
            Some(Beat::Send(env)) => vec![Action::Send(env)],
            Some(Beat::Missed) => vec![self.fail(true, "heartbeat ack overdue")],
            None => Vec::new(),
        }
    }

    /// The transport closed underneath us.
    pub fn on_transport_closed(&mut self, code: Option<u16>, reason: &str) {
        if self.state == SessionState::Closed {
            return;
        }
        let fresh = code.map(CloseCode).is_some_and(CloseCode::requires_fresh_session);
        let err = GatewayError::TransportFailure(format!(
            "closed by peer: code={} reason={reason:?}",
            code.map(|c| CloseCode(c).to_string()).unwrap_or_else(|| "none".into())
        ));
        tracing::warn!(error = %err, fresh_session = fresh, "connection lost");
        self.enter_reconnecting(!fresh);
    }

    pub fn on_transport_error(&mut self, error: &str) {
        if self.state == SessionState::Closed {
            return;
        }
        let err = GatewayError::TransportFailure(error.to_string());
        tracing::warn!(error = %err, "connection lost");
        self.enter_reconnecting(true);
    }

    /// Caller-initiated shutdown. Terminal.
    pub fn close(&mut self) {
        self.heartbeat.stop();
        if self.state != SessionState::Closed {
            self.transition(SessionState::Closed);
        }
    }

    fn violation(&mut self, msg: String) -> Action {
        let err = GatewayError::ProtocolViolation(msg);
        tracing::warn!(error = %err, state = %self.state, "reconnecting");
        self.fail(true, "protocol violation")
    }

    /// Machine-initiated disconnect. A resumable session is left open server-side
    /// by closing with a non-normal code; a discarded one is closed normally.
    fn fail(&mut self, keep_session: bool, reason: &'static str) -> Action {
        self.enter_reconnecting(keep_session);
        let code = if keep_session {
            CloseCode::UNKNOWN_ERROR
        } else {
            CloseCode::NORMAL
        };
        Action::Disconnect { code: code.0, reason }
    }

    fn enter_reconnecting(&mut self, keep_session: bool) {
        self.heartbeat.stop();
        if !keep_session {
            self.clear_session();
        }
        self.transition(SessionState::Reconnecting);
    }

    fn clear_session(&mut self) {
        self.resume_cursor = None;
        self.session_id = None;
        self.resume_url = None;
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            tracing::debug!(from = %self.state, %to, cursor = ?self.resume_cursor, "session transition");
            self.state = to;
        }
    }
}

fn resume_url_with_query(resume_url: &str, base_url: &str) -> String {
    if resume_url.contains('?') {
        return resume_url.to_string();
    }
    match base_url.split_once('?') {
        Some((_, query)) => format!("{}/?{query}", resume_url.trim_end_matches('/')),
        None => resume_url.to_string(),
    }
}
