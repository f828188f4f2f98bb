//! In-memory transport
//!
//! A [`MemoryBus`] is the shared broker: one `tokio::sync::broadcast` channel
//! per channel name. Each [`MemoryTransport`] attached to the same bus sees
//! the same channels, so a server and any number of clients can run in one
//! process.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{TransportError, TransportResult};
use crate::subscription::Subscription;
use crate::transport::{MessageCallback, Transport, TransportStatistics};

/// Configuration for the in-memory bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTransportConfig {
    /// Payloads buffered per channel before slow subscribers start losing messages
    pub channel_capacity: usize,
}

impl Default for MemoryTransportConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Shared in-process broker
#[derive(Debug, Clone)]
pub struct MemoryBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
    config: MemoryTransportConfig,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::with_config(MemoryTransportConfig::default())
    }

    pub fn with_config(config: MemoryTransportConfig) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Number of live receivers on a channel
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .get(channel)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of channels currently held by the bus
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Send to current receivers. Channels nobody listens to are not kept.
    fn send(&self, channel: &str, payload: String) -> usize {
        let mut channels = self.channels.lock();
        let sent = channels.get(channel).map(|sender| sender.send(payload));
        match sent {
            Some(Ok(receivers)) => receivers,
            Some(Err(_)) => {
                channels.remove(channel);
                0
            }
            None => 0,
        }
    }

    fn receiver(&self, channel: &str) -> broadcast::Receiver<String> {
        let capacity = self.config.channel_capacity.max(1);
        self.channels
            .lock()
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(capacity).0)
            .subscribe()
    }

    /// Drop the channel entry once its last receiver is gone
    fn release(&self, channel: &str) {
        let mut channels = self.channels.lock();
        if channels
            .get(channel)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(channel);
            trace!(channel, "released idle channel");
        }
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    delivered: AtomicU64,
    lagged: AtomicU64,
    subscriptions: AtomicU64,
}

/// A connection to a [`MemoryBus`]
#[derive(Debug)]
pub struct MemoryTransport {
    bus: MemoryBus,
    connected: AtomicBool,
    /// Parent of every subscription token; replaced on each connect
    root: Mutex<CancellationToken>,
    counters: Arc<Counters>,
}

impl MemoryTransport {
    pub fn new(bus: MemoryBus) -> Self {
        Self {
            bus,
            connected: AtomicBool::new(false),
            root: Mutex::new(CancellationToken::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    fn ensure_connected(&self) -> TransportResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    async fn deliver(
        bus: MemoryBus,
        channel: String,
        mut rx: broadcast::Receiver<String>,
        on_message: MessageCallback,
        token: CancellationToken,
        counters: Arc<Counters>,
    ) {
        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    trace!(channel = %channel, "subscription cancelled");
                    break;
                }
                received = rx.recv() => match received {
                    Ok(payload) => {
                        counters.delivered.fetch_add(1, Ordering::Relaxed);
                        on_message(payload);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        counters.lagged.fetch_add(skipped, Ordering::Relaxed);
                        warn!(channel = %channel, skipped, "subscriber lagged, messages lost");
                    }
                    Err(RecvError::Closed) => {
                        debug!(channel = %channel, "channel closed, ending subscription");
                        break;
                    }
                }
            }
        }

        drop(rx);
        bus.release(&channel);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> TransportResult<()> {
        if self.connected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut root = self.root.lock();
        if root.is_cancelled() {
            *root = CancellationToken::new();
        }
        debug!("memory transport connected");
        Ok(())
    }

    async fn disconnect(&self) -> TransportResult<()> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.root.lock().cancel();
        debug!("memory transport disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, channel: &str, payload: String) -> TransportResult<()> {
        self.ensure_connected()?;
        self.counters.published.fetch_add(1, Ordering::Relaxed);

        // No receivers is not an error: pub/sub drops messages nobody listens to
        let receivers = self.bus.send(channel, payload);
        trace!(channel, receivers, "published");
        Ok(())
    }

    async fn subscribe(
        &self,
        channel: &str,
        on_message: MessageCallback,
    ) -> TransportResult<Subscription> {
        self.ensure_connected()?;

        // The receiver exists before this call returns, so nothing published
        // afterwards can be missed.
        let rx = self.bus.receiver(channel);
        let token = self.root.lock().child_token();

        tokio::spawn(Self::deliver(
            self.bus.clone(),
            channel.to_string(),
            rx,
            on_message,
            token.clone(),
            self.counters.clone(),
        ));

        self.counters.subscriptions.fetch_add(1, Ordering::Relaxed);
        debug!(channel, "subscribed");
        Ok(Subscription::new(channel, token))
    }

    fn statistics(&self) -> TransportStatistics {
        TransportStatistics {
            messages_published: self.counters.published.load(Ordering::Relaxed),
            messages_delivered: self.counters.delivered.load(Ordering::Relaxed),
            messages_lagged: self.counters.lagged.load(Ordering::Relaxed),
            subscriptions_opened: self.counters.subscriptions.load(Ordering::Relaxed),
        }
    }
}
