use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use cordgate_core::protocol::{Envelope, OpCode};

/// Result returned by consumer handlers. Errors are reported, never propagated.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Consumer callback, invoked synchronously with the decoded envelope.
pub type Handler = Arc<dyn Fn(&Envelope) -> HandlerResult + Send + Sync>;

/// What a registration listens to. The two namespaces never mix: an event-name
/// selector only ever sees Dispatch envelopes carrying that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    OpCode(OpCode),
    Event(String),
}

#[derive(Clone)]
struct Registration {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct Tables {
    by_op: DashMap<OpCode, Vec<Registration>>,
    by_event: DashMap<String, Vec<Registration>>,
    next_id: AtomicU64,
    failures: AtomicU64,
}

impl Tables {
    fn remove(&self, selector: &Selector, id: u64) -> bool {
        fn retain(list: &mut Vec<Registration>, id: u64) -> bool {
            let before = list.len();
            list.retain(|r| r.id != id);
            before != list.len()
        }
        match selector {
            Selector::OpCode(op) => self
                .by_op
                .get_mut(op)
                .map(|mut l| retain(&mut l, id))
                .unwrap_or(false),
            Selector::Event(name) => self
                .by_event
                .get_mut(name.as_str())
                .map(|mut l| retain(&mut l, id))
                .unwrap_or(false),
        }
    }

    fn snapshot(&self, selector: &Selector) -> Vec<Registration> {
        match selector {
            Selector::OpCode(op) => self.by_op.get(op).map(|l| l.clone()).unwrap_or_default(),
            Selector::Event(name) => self
                .by_event
                .get(name.as_str())
                .map(|l| l.clone())
                .unwrap_or_default(),
        }
    }
}

/// Ordered handler lists per op code and per event name.
///
/// Cheap to clone; clones share the same tables. Each client owns its own
/// registry, so independent sessions never see each other's handlers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    tables: Arc<Tables>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `selector`. Invocation order is registration order.
    pub fn register<F>(&self, selector: Selector, handler: F) -> Deregistration
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.tables.next_id.fetch_add(1, Ordering::Relaxed);
        let reg = Registration {
            id,
            handler: Arc::new(handler),
        };
        match &selector {
            Selector::OpCode(op) => self.tables.by_op.entry(*op).or_default().push(reg),
            Selector::Event(name) => self.tables.by_event.entry(name.clone()).or_default().push(reg),
        }
        tracing::debug!(?selector, id, "handler registered");
        Deregistration {
            tables: Arc::downgrade(&self.tables),
            selector,
            id,
        }
    }

    pub fn on_op_code<F>(&self, op: OpCode, handler: F) -> Deregistration
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Selector::OpCode(op), handler)
    }

    pub fn on_event<F>(&self, event: impl Into<String>, handler: F) -> Deregistration
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(Selector::Event(event.into()), handler)
    }

    /// Invoke every handler currently registered for `selector`, in order.
    ///
    /// The list is snapshotted first and no lock is held while handlers run, so
    /// a handler may register or deregister without deadlocking. A handler that
    /// errors or panics is reported and the remaining handlers still run.
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, selector: &Selector, env: &Envelope) -> usize {
        let regs = self.tables.snapshot(selector);
        for reg in &regs {
            let outcome = catch_unwind(AssertUnwindSafe(|| (reg.handler)(env)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            self.tables.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                target: "cordgate::diagnostics",
                ?selector,
                handler_id = reg.id,
                op = %env.op(),
                error = %failure,
                "handler failed"
            );
        }
        regs.len()
    }

    /// Forward one inbound envelope: op-code handlers first, then (for Dispatch)
    /// the handlers registered for its event name.
    pub fn forward(&self, env: &Envelope) {
        self.dispatch(&Selector::OpCode(env.op()), env);
        if let Some(event) = env.event() {
            self.dispatch(&Selector::Event(event.to_string()), env);
        }
    }

    pub fn handler_count(&self, selector: &Selector) -> usize {
        self.tables.snapshot(selector).len()
    }

    /// Total handler failures (errors and panics) since the registry was created.
    pub fn failure_count(&self) -> u64 {
        self.tables.failures.load(Ordering::Relaxed)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Token returned by [`HandlerRegistry::register`].
///
/// Removes exactly the registration it was created for. Dropping it does not
/// deregister; registrations never expire on their own.
#[derive(Debug, Clone)]
pub struct Deregistration {
    tables: Weak<Tables>,
    selector: Selector,
    id: u64,
}

impl Deregistration {
    /// Remove the registration. Returns `false` when it was already gone.
    pub fn deregister(&self) -> bool {
        match self.tables.upgrade() {
            Some(tables) => {
                let removed = tables.remove(&self.selector, self.id);
                if removed {
                    tracing::debug!(selector = ?self.selector, id = self.id, "handler deregistered");
                }
                removed
            }
            None => false,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        let make = move |tag: &'static str| -> Handler {
            let l = l.clone();
            Arc::new(move |_env: &Envelope| {
                l.lock().unwrap().push(tag);
                Ok(())
            })
        };
        (log, make)
    }

    fn hello() -> Envelope {
        Envelope::new(OpCode::HELLO, json!({"heartbeat_interval": 45000})).unwrap()
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let reg = HandlerRegistry::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        reg.on_op_code(OpCode::HELLO, move |e| a(e));
        reg.on_op_code(OpCode::HELLO, move |e| b(e));

        assert_eq!(reg.dispatch(&Selector::OpCode(OpCode::HELLO), &hello()), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn deregister_removes_exactly_one_and_is_idempotent() {
        let reg = HandlerRegistry::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let first = reg.on_op_code(OpCode::HELLO, move |e| a(e));
        reg.on_op_code(OpCode::HELLO, move |e| b(e));

        assert!(first.deregister());
        assert!(!first.deregister());

        reg.forward(&hello());
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn same_closure_registered_twice_is_two_registrations() {
        let reg = HandlerRegistry::new();
        let (log, make) = recorder();
        let h = make("h");
        let h2 = h.clone();
        let first = reg.on_op_code(OpCode::HELLO, move |e| h(e));
        reg.on_op_code(OpCode::HELLO, move |e| h2(e));

        first.deregister();
        reg.forward(&hello());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn failing_handlers_do_not_stop_siblings() {
        let reg = HandlerRegistry::new();
        let (log, make) = recorder();
        let last = make("last");
        reg.on_op_code(OpCode::HELLO, |_| Err("boom".into()));
        reg.on_op_code(OpCode::HELLO, |_| panic!("handler bug"));
        reg.on_op_code(OpCode::HELLO, move |e| last(e));

        assert_eq!(reg.dispatch(&Selector::OpCode(OpCode::HELLO), &hello()), 3);
        assert_eq!(*log.lock().unwrap(), vec!["last"]);
        assert_eq!(reg.failure_count(), 2);
    }

    #[test]
    fn event_namespace_is_keyed_by_event_name() {
        let reg = HandlerRegistry::new();
        let (log, make) = recorder();
        let op = make("op");
        let ready = make("ready");
        let other = make("other");
        reg.on_op_code(OpCode::DISPATCH, move |e| op(e));
        reg.on_event("READY", move |e| ready(e));
        reg.on_event("MESSAGE_CREATE", move |e| other(e));

        reg.forward(&Envelope::dispatch(1, "READY", json!({})));
        assert_eq!(*log.lock().unwrap(), vec!["op", "ready"]);

        // a non-dispatch envelope never reaches event handlers
        log.lock().unwrap().clear();
        reg.forward(&hello());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn handler_may_deregister_itself_during_dispatch() {
        let reg = HandlerRegistry::new();
        let slot: Arc<Mutex<Option<Deregistration>>> = Arc::new(Mutex::new(None));
        let s = slot.clone();
        let token = reg.on_op_code(OpCode::HELLO, move |_| {
            if let Some(t) = s.lock().unwrap().as_ref() {
                t.deregister();
            }
            Ok(())
        });
        *slot.lock().unwrap() = Some(token);

        reg.forward(&hello());
        assert_eq!(reg.handler_count(&Selector::OpCode(OpCode::HELLO)), 0);
    }

    #[test]
    fn unknown_selectors_are_noops() {
        let reg = HandlerRegistry::new();
        assert_eq!(reg.dispatch(&Selector::OpCode(OpCode(77)), &hello()), 0);
        assert_eq!(reg.dispatch(&Selector::Event("NOPE".into()), &hello()), 0);
    }
}
