//! Loadable listener pieces and their error-isolated lifecycle.
//!
//! A [`Listener`] is a handler function plus a small typed descriptor
//! (name, event, once flag, origin path). Loading subscribes a wrapped
//! handler to the bus; the wrapper guarantees a faulty handler never
//! crashes the dispatch loop: its error becomes a `listener_error` event
//! carrying the listener's identity, and delivery to siblings continues.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use herald_types::DispatchEvent;

use crate::bus::{EventBus, Handler, ListenerId};

/// Identifying metadata for one listener piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerDescriptor {
    /// Unique listener name within its owning set.
    pub name: String,
    /// Event the listener subscribes to.
    pub event: String,
    /// Whether the listener fires at most once.
    pub once: bool,
    /// Where the listener was registered from, for error reports.
    pub path: String,
}

/// A listener piece ready to be loaded into a [`ListenerSet`].
pub struct Listener {
    /// Identity and subscription mode.
    pub descriptor: ListenerDescriptor,
    /// The user-supplied handler. May fail; failures are isolated.
    pub handler: Handler,
}

impl Listener {
    /// A persistent listener.
    pub fn new(name: impl Into<String>, event: impl Into<String>, handler: Handler) -> Self {
        let name = name.into();
        Self {
            descriptor: ListenerDescriptor {
                path: format!("listeners/{name}"),
                name,
                event: event.into(),
                once: false,
            },
            handler,
        }
    }

    /// A listener that fires at most once, then unloads itself.
    pub fn once(name: impl Into<String>, event: impl Into<String>, handler: Handler) -> Self {
        let mut listener = Self::new(name, event, handler);
        listener.descriptor.once = true;
        listener
    }

    /// Override the origin path recorded in error reports.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.descriptor.path = path.into();
        self
    }
}

struct Loaded {
    descriptor: ListenerDescriptor,
    id: ListenerId,
}

/// The owning collection of loaded listeners bound to one bus.
///
/// Mutation (load, unload, `once` self-unload) happens on the same
/// cooperative loop that delivers events, so the internal lock is only
/// ever held briefly and never across an await.
#[derive(Clone)]
pub struct ListenerSet {
    bus: Arc<EventBus>,
    loaded: Arc<Mutex<HashMap<String, Loaded>>>,
}

impl ListenerSet {
    /// A set bound to `bus`.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            loaded: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The bus this set subscribes on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Load a listener: wrap its handler and subscribe it under the
    /// descriptor's mode. Loading a name that is already loaded replaces
    /// the previous registration (the old one is unloaded first).
    pub fn load(&self, listener: Listener) {
        if self.is_loaded(&listener.descriptor.name) {
            self.unload(&listener.descriptor.name);
        }

        let descriptor = listener.descriptor.clone();
        let wrapped = self.wrap(descriptor.clone(), listener.handler);

        let id = if descriptor.once {
            self.bus.once(descriptor.event.clone(), wrapped)
        } else {
            self.bus.on(descriptor.event.clone(), wrapped)
        };

        tracing::debug!(
            listener = %descriptor.name,
            event = %descriptor.event,
            once = descriptor.once,
            "listener loaded"
        );
        self.lock_loaded()
            .insert(descriptor.name.clone(), Loaded { descriptor, id });
    }

    /// Unload a listener by name, unsubscribing it from the bus.
    ///
    /// A `once` listener gets no explicit unsubscribe: the bus's own
    /// once-semantics already removed (or will consume) its subscription.
    /// Returns whether a listener was actually unloaded.
    pub fn unload(&self, name: &str) -> bool {
        let Some(loaded) = self.lock_loaded().remove(name) else {
            return false;
        };
        if !loaded.descriptor.once {
            self.bus.off(&loaded.descriptor.event, loaded.id);
        }
        tracing::debug!(listener = name, "listener unloaded");
        true
    }

    /// Whether a listener with this name is currently loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.lock_loaded().contains_key(name)
    }

    /// Number of loaded listeners.
    pub fn len(&self) -> usize {
        self.lock_loaded().len()
    }

    /// Whether no listeners are loaded.
    pub fn is_empty(&self) -> bool {
        self.lock_loaded().is_empty()
    }

    /// Build the invocation wrapper: isolate handler errors into
    /// `listener_error` events, then self-unload `once` listeners
    /// regardless of handler outcome.
    fn wrap(&self, descriptor: ListenerDescriptor, handler: Handler) -> Handler {
        let bus = Arc::clone(&self.bus);
        let loaded = Arc::clone(&self.loaded);

        Arc::new(move |event: DispatchEvent| {
            let bus = Arc::clone(&bus);
            let loaded = Arc::clone(&loaded);
            let descriptor = descriptor.clone();
            let handler = Arc::clone(&handler);

            Box::pin(async move {
                if let Err(err) = handler(event).await {
                    tracing::warn!(
                        listener = %descriptor.name,
                        event = %descriptor.event,
                        path = %descriptor.path,
                        error = %err,
                        "listener handler failed"
                    );
                    // A failing listener_error listener would re-enter
                    // forever; its failure stays in the log only.
                    if descriptor.event != "listener_error" {
                        bus.emit(DispatchEvent::ListenerError {
                            error: err.to_string(),
                            name: descriptor.name.clone(),
                            event: descriptor.event.clone(),
                            path: descriptor.path.clone(),
                        })
                        .await;
                    }
                }

                if descriptor.once {
                    loaded
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .remove(&descriptor.name);
                }
                Ok(())
            })
        })
    }

    fn lock_loaded(&self) -> std::sync::MutexGuard<'_, HashMap<String, Loaded>> {
        self.loaded.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use herald_types::{DispatchError, Message};

    use super::*;

    fn message_event() -> DispatchEvent {
        DispatchEvent::Message {
            message: Message::direct("hi", "1", "100"),
        }
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_event| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    fn failing_handler() -> Handler {
        Arc::new(|_event| Box::pin(async { Err(DispatchError::handler("kaboom")) }))
    }

    #[tokio::test]
    async fn load_and_unload_roundtrip() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));
        let count = Arc::new(AtomicUsize::new(0));

        set.load(Listener::new("greet", "message", counting_handler(Arc::clone(&count))));
        assert!(set.is_loaded("greet"));

        bus.emit(message_event()).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(set.unload("greet"));
        bus.emit(message_event()).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!set.is_loaded("greet"));
    }

    #[tokio::test]
    async fn once_listener_self_unloads_on_success() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));
        let count = Arc::new(AtomicUsize::new(0));

        set.load(Listener::once("ready", "message", counting_handler(Arc::clone(&count))));
        bus.emit(message_event()).await;
        bus.emit(message_event()).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!set.is_loaded("ready"), "once listener must self-unload");
    }

    #[tokio::test]
    async fn once_listener_self_unloads_on_failure() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));

        set.load(Listener::once("ready", "message", failing_handler()));
        bus.emit(message_event()).await;

        assert!(!set.is_loaded("ready"), "self-unload must not depend on success");
    }

    #[tokio::test]
    async fn failure_is_reemitted_as_listener_error() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));

        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        set.load(Listener::new(
            "observer",
            "listener_error",
            Arc::new(move |event| {
                let seen = Arc::clone(&seen_clone);
                Box::pin(async move {
                    if let DispatchEvent::ListenerError { name, error, .. } = event {
                        seen.lock().unwrap().push((name, error));
                    }
                    Ok(())
                })
            }),
        ));
        set.load(Listener::new("broken", "message", failing_handler()));

        bus.emit(message_event()).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "broken");
        assert!(seen[0].1.contains("kaboom"));
    }

    #[tokio::test]
    async fn failing_listener_never_blocks_siblings() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));
        let count = Arc::new(AtomicUsize::new(0));

        set.load(Listener::new("broken", "message", failing_handler()));
        set.load(Listener::new("healthy", "message", counting_handler(Arc::clone(&count))));

        bus.emit(message_event()).await;
        bus.emit(message_event()).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unload_of_fired_once_listener_is_noop() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));

        set.load(Listener::once("ready", "message", failing_handler()));
        bus.emit(message_event()).await;
        assert!(!set.unload("ready"), "already self-unloaded");
    }

    #[tokio::test]
    async fn reload_replaces_previous_registration() {
        let bus = Arc::new(EventBus::new());
        let set = ListenerSet::new(Arc::clone(&bus));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        set.load(Listener::new("greet", "message", counting_handler(Arc::clone(&first))));
        set.load(Listener::new("greet", "message", counting_handler(Arc::clone(&second))));

        bus.emit(message_event()).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(set.len(), 1);
    }
}
