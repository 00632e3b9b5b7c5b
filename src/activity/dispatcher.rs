//! Fire-and-forget delivery of activity events and notifications.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ActivityEvent;
use super::notifications::Notification;

/// Largest batch handed to a sink in one call.
const MAX_BATCH: usize = 50;

/// Destination for activity events and notifications.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, events: Vec<ActivityEvent>) -> Result<()>;

    async fn notify(&self, notifications: Vec<Notification>) -> Result<()>;
}

enum Outbound {
    Events(Vec<ActivityEvent>),
    Notifications(Vec<Notification>),
}

#[derive(Default)]
struct Pending {
    events: Vec<ActivityEvent>,
    notifications: Vec<Notification>,
}

impl Pending {
    fn push(&mut self, message: Outbound) {
        match message {
            Outbound::Events(events) => self.events.extend(events),
            Outbound::Notifications(rows) => self.notifications.extend(rows),
        }
    }

    fn len(&self) -> usize {
        self.events.len() + self.notifications.len()
    }

    async fn flush(&mut self, sink: &dyn ActivitySink) {
        if !self.events.is_empty() {
            let count = self.events.len();
            match sink.record(std::mem::take(&mut self.events)).await {
                Ok(()) => debug!(count, "Recorded activity events"),
                Err(e) => warn!(count, error = %format!("{:#}", e), "Failed to record activity events"),
            }
        }
        if !self.notifications.is_empty() {
            let count = self.notifications.len();
            match sink.notify(std::mem::take(&mut self.notifications)).await {
                Ok(()) => debug!(count, "Stored notifications"),
                Err(e) => warn!(count, error = %format!("{:#}", e), "Failed to store notifications"),
            }
        }
    }
}

/// Queues events and notifications and writes them from a background task.
///
/// `send` and `notify` never block and never fail from the caller's point of
/// view. A failed sink write is logged and the batch is dropped.
pub struct ActivityDispatcher {
    tx: Option<mpsc::UnboundedSender<Outbound>>,
    writer: Option<JoinHandle<()>>,
}

impl ActivityDispatcher {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(sink: Arc<dyn ActivitySink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();

        let writer = tokio::spawn(async move {
            let mut pending = Pending::default();
            while let Some(message) = rx.recv().await {
                pending.push(message);
                while pending.len() < MAX_BATCH {
                    match rx.try_recv() {
                        Ok(more) => pending.push(more),
                        Err(_) => break,
                    }
                }
                pending.flush(sink.as_ref()).await;
            }
        });

        Self {
            tx: Some(tx),
            writer: Some(writer),
        }
    }

    /// A dispatcher that discards everything (activity disabled).
    pub fn disabled() -> Self {
        Self {
            tx: None,
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn send(&self, events: Vec<ActivityEvent>) {
        if !events.is_empty() {
            self.enqueue(Outbound::Events(events));
        }
    }

    pub fn notify(&self, notifications: Vec<Notification>) {
        if !notifications.is_empty() {
            self.enqueue(Outbound::Notifications(notifications));
        }
    }

    fn enqueue(&self, message: Outbound) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(message).is_err() {
            warn!("Activity writer stopped; events dropped");
        }
    }

    /// Close the queue and wait for queued events to be written.
    pub async fn shutdown(mut self) {
        drop(self.tx.take());
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                warn!(error = %e, "Activity writer task panicked");
            }
        }
    }
}
