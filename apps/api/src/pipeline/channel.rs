//! Ordered single-producer/single-consumer bridge between a run's background task and
//! whoever is streaming its events.
//!
//! The channel is bounded, but a step send never waits longer than the configured grace
//! period, so a stalled consumer cannot hold a run open. One extra slot is reserved up front
//! for the terminal event; it is always delivered unless the consumer is gone, and the
//! receiver reports end-of-stream right after it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc::{self, error::SendTimeoutError, OwnedPermit};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use super::events::ProgressEvent;

/// What happened to a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The consumer did not make room within the grace period; the event was discarded.
    Dropped,
    /// The consumer went away; this and every later event is discarded.
    Detached,
}

/// `capacity` slots for steps plus the one held back for the terminal event.
pub fn progress_channel(capacity: usize, grace: Duration) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1) + 1);
    (
        ProgressSender {
            tx,
            grace,
            detached: Arc::new(AtomicBool::new(false)),
        },
        ProgressReceiver { rx, ended: false },
    )
}

#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
    grace: Duration,
    detached: Arc<AtomicBool>,
}

impl ProgressSender {
    pub async fn send(&self, event: ProgressEvent) -> Delivery {
        if self.is_detached() {
            return Delivery::Detached;
        }

        match self.tx.send_timeout(event, self.grace).await {
            Ok(()) => Delivery::Delivered,
            Err(SendTimeoutError::Timeout(event)) => {
                warn!(
                    "Progress consumer stalled for {}ms, dropping {:?}",
                    self.grace.as_millis(),
                    event
                );
                Delivery::Dropped
            }
            Err(SendTimeoutError::Closed(_)) => {
                self.mark_detached();
                Delivery::Detached
            }
        }
    }

    /// Claims the slot the terminal event will be written into. Call before any step is sent
    /// so the claim never has to wait on the consumer.
    pub async fn reserve_terminal(&self) -> TerminalSlot {
        match self.tx.clone().reserve_owned().await {
            Ok(permit) => TerminalSlot {
                permit: Some(permit),
                detached: self.detached.clone(),
            },
            Err(_) => {
                self.mark_detached();
                TerminalSlot {
                    permit: None,
                    detached: self.detached.clone(),
                }
            }
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Relaxed)
    }

    fn mark_detached(&self) {
        if !self.detached.swap(true, Ordering::Relaxed) {
            debug!("Progress consumer disconnected; remaining events will be discarded");
        }
    }
}

/// Capacity held back for a run's single `result` or `error` event.
#[derive(Debug)]
pub struct TerminalSlot {
    permit: Option<OwnedPermit<ProgressEvent>>,
    detached: Arc<AtomicBool>,
}

impl TerminalSlot {
    pub fn deliver(self, event: ProgressEvent) -> Delivery {
        debug_assert!(event.is_terminal());
        let Some(permit) = self.permit else {
            return Delivery::Detached;
        };
        let tx = permit.send(event);
        if tx.is_closed() {
            self.detached.store(true, Ordering::Relaxed);
            Delivery::Detached
        } else {
            Delivery::Delivered
        }
    }
}

/// Non-terminal half of a sender, handed to pipeline stages so they can only report steps.
#[derive(Debug, Clone)]
pub struct StepSink {
    sender: ProgressSender,
}

impl StepSink {
    pub fn new(sender: ProgressSender) -> Self {
        Self { sender }
    }

    pub async fn step(&self, description: impl Into<String>) {
        self.sender.send(ProgressEvent::step(description)).await;
    }
}

#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressEvent>,
    ended: bool,
}

impl ProgressReceiver {
    /// Next event in emission order, or `None` once the terminal event has been returned.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        if self.ended {
            return None;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.ended = event.is_terminal();
                Some(event)
            }
            None => {
                self.ended = true;
                None
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> + Send + 'static {
        let mut ended = self.ended;
        ReceiverStream::new(self.rx).map_while(move |event| {
            if ended {
                return None;
            }
            ended = event.is_terminal();
            Some(event)
        })
    }
}
