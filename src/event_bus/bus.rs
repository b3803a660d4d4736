use std::sync::{Arc, Mutex};

use tokio::{sync::oneshot, task};

use super::event::Event;
use super::sink::{EventSink, StdOutSink};

/// Receives events from producers and broadcasts them to every sink.
///
/// The driver and agents only ever hold a cloned sender; the bus itself owns
/// the sinks and the background listener task that drains the channel.
pub struct EventBus {
    sinks: Arc<Mutex<Vec<Box<dyn EventSink>>>>,
    event_channel: (flume::Sender<Event>, flume::Receiver<Event>),
    listener: Arc<Mutex<Option<ListenerState>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_sink(StdOutSink::default())
    }
}

impl EventBus {
    /// Creates an event bus with a single sink.
    pub fn with_sink<T>(sink: T) -> Self
    where
        T: EventSink + 'static,
    {
        Self {
            sinks: Arc::new(Mutex::new(vec![Box::new(sink)])),
            event_channel: flume::unbounded(),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates an event bus with multiple sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self {
            sinks: Arc::new(Mutex::new(sinks)),
            event_channel: flume::unbounded(),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Dynamically adds a sink.
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.push(Box::new(sink));
        }
    }

    /// Clones the sender side so producers can emit events.
    pub fn get_sender(&self) -> flume::Sender<Event> {
        self.event_channel.0.clone()
    }

    /// Spawns a background task that drains the channel into all sinks.
    /// Idempotent: calling multiple times has no effect.
    pub fn listen_for_events(&self) {
        let mut guard = self.listener.lock().expect("listener poisoned");
        if guard.is_some() {
            return;
        }

        let receiver = self.event_channel.1.clone();
        let sinks = self.sinks.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = task::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    recv = receiver.recv_async() => match recv {
                        Err(e) => {
                            tracing::warn!(error = %e, "event bus receiver closed");
                            break;
                        }
                        Ok(event) => {
                            let mut sinks_guard = match sinks.lock() {
                                Ok(guard) => guard,
                                Err(_) => break,
                            };
                            for sink in sinks_guard.iter_mut() {
                                if let Err(e) = sink.handle(&event) {
                                    tracing::warn!(error = %e, "event sink error");
                                }
                            }
                        }
                    }
                }
            }
        });

        *guard = Some(ListenerState { shutdown_tx, handle });
    }

    /// Stops the background listener task and waits for it to finish.
    pub async fn stop_listener(&self) {
        let state = {
            let mut guard = self.listener.lock().expect("listener poisoned");
            guard.take()
        };
        if let Some(state) = state {
            let _ = state.shutdown_tx.send(());
            let _ = state.handle.await;
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.listener.lock() {
            if let Some(state) = guard.take() {
                let _ = state.shutdown_tx.send(());
                state.handle.abort();
            }
        }
    }
}

struct ListenerState {
    shutdown_tx: oneshot::Sender<()>,
    handle: task::JoinHandle<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::MemorySink;

    #[tokio::test]
    async fn events_reach_every_sink_in_order() {
        let first = MemorySink::new();
        let second = MemorySink::new();
        let bus = EventBus::with_sinks(vec![
            Box::new(first.clone()),
            Box::new(second.clone()),
        ]);
        bus.listen_for_events();

        let sender = bus.get_sender();
        sender.send(Event::turn("user", 1, "hi")).unwrap();
        sender.send(Event::turn("admin", 2, "task")).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        bus.stop_listener().await;

        for sink in [&first, &second] {
            let events = sink.snapshot();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].scope(), "user");
            assert_eq!(events[1].scope(), "admin");
        }
    }

    #[tokio::test]
    async fn listen_is_idempotent() {
        let sink = MemorySink::new();
        let bus = EventBus::with_sink(sink.clone());
        bus.listen_for_events();
        bus.listen_for_events();

        bus.get_sender().send(Event::turn("user", 1, "hi")).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        bus.stop_listener().await;

        assert_eq!(sink.snapshot().len(), 1);
    }
}
