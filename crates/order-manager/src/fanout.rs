//! Ordered observer fan-out
//!
//! Mutators publish owned snapshots into an unbounded channel while the
//! entity's map entry is still held; the send is lock-free, so the hot
//! path is never delayed and the queue order equals the transition
//! order. A dedicated notifier thread drains the channel and invokes
//! the registered listeners, which therefore never run under an entity
//! lock.

use std::sync::Arc;

use crossbeam_channel::{Sender, unbounded};
use log::warn;
use parking_lot::RwLock;

type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A single-threaded, strictly ordered notification stage
pub(crate) struct Fanout<T> {
    listeners: Arc<RwLock<Vec<Listener<T>>>>,
    tx: Sender<T>,
}

impl<T: Send + 'static> Fanout<T> {
    /// Spawn the notifier thread. The thread exits when the `Fanout`
    /// (and with it the sender) is dropped.
    pub fn new(name: &str) -> Self {
        let (tx, rx) = unbounded::<T>();
        let listeners: Arc<RwLock<Vec<Listener<T>>>> = Arc::new(RwLock::new(Vec::new()));

        let thread_listeners = Arc::clone(&listeners);
        let spawned = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for event in rx.iter() {
                    for listener in thread_listeners.read().iter() {
                        listener(&event);
                    }
                }
            });
        if let Err(e) = spawned {
            warn!("failed to spawn notifier thread {name}: {e}");
        }

        Self { listeners, tx }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    /// Enqueue an event. Never blocks; ordering is FIFO.
    pub fn publish(&self, event: T) {
        // Only fails when the notifier thread is gone, i.e. at shutdown
        let _ = self.tx.send(event);
    }
}
