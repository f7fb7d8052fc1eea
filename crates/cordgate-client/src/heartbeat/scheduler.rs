use tokio::time::{Duration, Instant};

use cordgate_core::protocol::Envelope;

/// Outcome of a due heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub enum Beat {
    /// Send this heartbeat; an acknowledgement is now outstanding.
    Send(Envelope),
    /// The previous heartbeat was never acknowledged. The scheduler has stopped
    /// itself; the connection must be considered dead.
    Missed,
}

/// Tracks the heartbeat interval, the next deadline and the outstanding ack.
#[derive(Debug, Default)]
pub struct HeartbeatScheduler {
    interval: Option<Duration>,
    next_at: Option<Instant>,
    pending_ack: bool,
}

impl HeartbeatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start beating every `interval`, the first beat after a random delay in
    /// `[0, interval)` so a fleet of reconnecting clients spreads out.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        let span_ms = interval.as_millis().max(1) as u64;
        let jitter = Duration::from_millis(rand::random_range(0..span_ms));
        self.start_with_initial_delay(interval, now, jitter);
    }

    pub fn start_with_initial_delay(&mut self, interval: Duration, now: Instant, initial: Duration) {
        self.interval = Some(interval);
        self.next_at = Some(now + initial.min(interval));
        self.pending_ack = false;
        tracing::debug!(interval_ms = interval.as_millis() as u64, initial_ms = initial.as_millis() as u64, "heartbeat started");
    }

    /// When the next beat is due, `None` while stopped.
    pub fn deadline(&self) -> Option<Instant> {
        self.next_at
    }

    /// Fire if due. `cursor` is the resume cursor sent with the heartbeat.
    pub fn fire(&mut self, now: Instant, cursor: Option<u64>) -> Option<Beat> {
        let (interval, next_at) = match (self.interval, self.next_at) {
            (Some(i), Some(n)) => (i, n),
            _ => return None,
        };
        if now < next_at {
            return None;
        }
        if self.pending_ack {
            tracing::warn!(interval_ms = interval.as_millis() as u64, "heartbeat ack overdue");
            self.stop();
            return Some(Beat::Missed);
        }
        self.pending_ack = true;
        self.next_at = Some(now + interval);
        Some(Beat::Send(Envelope::heartbeat(cursor)))
    }

    pub fn acknowledge(&mut self) {
        self.pending_ack = false;
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        self.interval = None;
        self.next_at = None;
        self.pending_ack = false;
    }

    pub fn is_running(&self) -> bool {
        self.next_at.is_some()
    }

    pub fn pending_ack(&self) -> bool {
        self.pending_ack
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}
