//! Observer bus carrying module lifecycle and audit messages.
//!
//! The bus is an explicit event channel owned by the process context and
//! passed by reference to anything that publishes or subscribes. Delivery is
//! synchronous, in subscription order, on the caller's thread.

use std::cell::RefCell;
use std::rc::Rc;

/// A listener on the observer bus.
pub trait Observer {
    /// Stable identifier; subscribing the same name twice is a no-op.
    fn name(&self) -> &str;

    /// Receive a published message.
    ///
    /// Errors are contained per-listener: a failing observer never blocks
    /// delivery to the remaining observers.
    fn notify(&mut self, message: &str) -> anyhow::Result<()>;
}

/// Fan-out notification channel for lifecycle and audit events.
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<Box<dyn Observer>>,
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBus").field("observers", &self.observers.len()).finish()
    }
}

impl ObserverBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer. Idempotent: a second observer with the same
    /// name is dropped.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        if self.observers.iter().any(|o| o.name() == observer.name()) {
            return;
        }
        self.observers.push(observer);
    }

    /// Remove the observer with the given name. Returns whether one was removed.
    pub fn unsubscribe(&mut self, name: &str) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.name() != name);
        self.observers.len() != before
    }

    /// Deliver `message` to every subscriber in subscription order.
    pub fn publish(&mut self, message: &str) {
        for observer in &mut self.observers {
            if let Err(e) = observer.notify(message) {
                tracing::warn!(observer = observer.name(), error = %e, "Observer failed");
            }
        }
    }

    /// Number of current subscribers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

/// Observer that retains every delivered message in order.
///
/// Cloning yields a handle onto the same log, so the entries stay readable
/// after the observer itself has been boxed into the bus.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl AuditLog {
    /// Create an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivered messages, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Number of delivered messages.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing has been delivered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Observer for AuditLog {
    fn name(&self) -> &str {
        "audit"
    }

    fn notify(&mut self, message: &str) -> anyhow::Result<()> {
        self.entries.borrow_mut().push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Observer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn notify(&mut self, _message: &str) -> anyhow::Result<()> {
            anyhow::bail!("observer is broken")
        }
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut bus = ObserverBus::new();
        bus.subscribe(Box::new(AuditLog::new()));
        bus.subscribe(Box::new(AuditLog::new()));
        assert_eq!(bus.observer_count(), 1);
    }

    #[test]
    fn test_publish_delivers_in_order() {
        let mut bus = ObserverBus::new();
        let audit = AuditLog::new();
        bus.subscribe(Box::new(audit.clone()));

        bus.publish("first");
        bus.publish("second");

        assert_eq!(audit.entries(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_failing_observer_does_not_block_delivery() {
        let mut bus = ObserverBus::new();
        let audit = AuditLog::new();
        bus.subscribe(Box::new(Failing));
        bus.subscribe(Box::new(audit.clone()));

        bus.publish("still delivered");

        assert_eq!(audit.entries(), vec!["still delivered".to_string()]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = ObserverBus::new();
        let audit = AuditLog::new();
        bus.subscribe(Box::new(audit.clone()));

        assert!(bus.unsubscribe("audit"));
        assert!(!bus.unsubscribe("audit"));

        bus.publish("dropped");
        assert!(audit.is_empty());
    }
}
