use std::sync::Weak;

use futures_util::Stream;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::bus::{BusInner, ConsumerId};

/// A registered consumer of one topic.
///
/// Yields payloads in publish order. Dropping it deregisters the consumer;
/// there is no way to resume from where it left off.
pub struct Subscription<T> {
    id: ConsumerId,
    topic: String,
    receiver: broadcast::Receiver<T>,
    bus: Weak<BusInner<T>>,
}

impl<T: Clone> Subscription<T> {
    pub(crate) fn new(
        id: ConsumerId,
        topic: String,
        receiver: broadcast::Receiver<T>,
        bus: Weak<BusInner<T>>,
    ) -> Self {
        Self {
            id,
            topic,
            receiver,
            bus,
        }
    }

    pub fn id(&self) -> ConsumerId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next payload. Returns `None` only once the bus is gone.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(RecvError::Lagged(skipped)) => self.log_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next payload if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => return Some(payload),
                Err(TryRecvError::Lagged(skipped)) => self.log_lag(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turn the subscription into a stream. Dropping the stream unsubscribes.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send
    where
        T: Send + 'static,
    {
        let mut subscription = self;
        async_stream::stream! {
            while let Some(payload) = subscription.recv().await {
                yield payload;
            }
        }
    }

    fn log_lag(&self, skipped: u64) {
        warn!(
            topic = %self.topic,
            consumer = self.id,
            skipped,
            "consumer lagged, oldest payloads dropped"
        );
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove_consumer(&self.topic, self.id);
        }
    }
}
