use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::subscription::Subscription;

/// Default per-topic buffer size.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Largest per-topic buffer a bus will allocate.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Identifies one registered consumer for the lifetime of the bus.
pub type ConsumerId = u64;

/// Fans published payloads out to every consumer registered on a topic.
pub struct EventBus<T> {
    inner: Arc<BusInner<T>>,
}

pub(crate) struct BusInner<T> {
    capacity: usize,
    next_consumer: AtomicU64,

    /// topic -> live consumers and the ring buffer feeding them.
    /// Registry changes and fan-out both happen under this lock.
    topics: Mutex<HashMap<String, TopicEntry<T>>>,
}

struct TopicEntry<T> {
    sender: broadcast::Sender<T>,
    consumers: HashSet<ConsumerId>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> EventBus<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus whose topics each buffer payloads for lagging consumers.
    /// `capacity` is clamped to `1..=MAX_CAPACITY` and rounded up to a power
    /// of two; [`EventBus::capacity`] reports the size actually used.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                capacity: capacity.clamp(1, MAX_CAPACITY).next_power_of_two(),
                next_consumer: AtomicU64::new(1),
                topics: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Payloads retained per topic before a lagging consumer loses the oldest.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Queue `payload` for every consumer currently subscribed to `topic`.
    /// Returns how many consumers it was queued for; zero means it was dropped.
    pub fn publish(&self, topic: &str, payload: T) -> usize {
        let topics = self.inner.topics();
        let Some(entry) = topics.get(topic) else {
            trace!(topic, "no consumers, payload dropped");
            return 0;
        };

        // Only fails when every receiver is gone, which the registry rules out.
        let delivered = entry.sender.send(payload).unwrap_or(0);
        debug!(topic, delivered, "published");
        delivered
    }

    /// Register a new consumer on `topic`. It sees payloads published from
    /// now on; nothing earlier is replayed.
    pub fn subscribe(&self, topic: &str) -> Subscription<T> {
        let id = self.inner.next_consumer.fetch_add(1, Ordering::Relaxed);
        let capacity = self.inner.capacity;

        let mut topics = self.inner.topics();
        let entry = topics.entry(topic.to_owned()).or_insert_with(|| TopicEntry {
            sender: broadcast::channel(capacity).0,
            consumers: HashSet::new(),
        });
        entry.consumers.insert(id);
        let receiver = entry.sender.subscribe();
        drop(topics);

        debug!(topic, consumer = id, "subscribed");
        Subscription::new(id, topic.to_owned(), receiver, Arc::downgrade(&self.inner))
    }

    /// Deregister a consumer. Equivalent to dropping the subscription.
    pub fn unsubscribe(&self, subscription: Subscription<T>) {
        drop(subscription);
    }

    /// Number of consumers currently registered on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .topics()
            .get(topic)
            .map_or(0, |entry| entry.consumers.len())
    }

    /// Number of topics with at least one consumer.
    pub fn topic_count(&self) -> usize {
        self.inner.topics().len()
    }
}

impl<T> BusInner<T> {
    // publish must never fail visibly, so a poisoned registry is still used.
    fn topics(&self) -> MutexGuard<'_, HashMap<String, TopicEntry<T>>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove a consumer from `topic`. Returns false if it was already gone.
    /// Topics left without consumers are dropped from the registry.
    pub(crate) fn remove_consumer(&self, topic: &str, id: ConsumerId) -> bool {
        let mut topics = self.topics();
        let Some(entry) = topics.get_mut(topic) else {
            return false;
        };

        let removed = entry.consumers.remove(&id);
        if entry.consumers.is_empty() {
            topics.remove(topic);
        }
        if removed {
            debug!(topic, consumer = id, "unsubscribed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;

    use super::*;

    const TOPIC: &str = "MESSAGE.CREATED";

    #[tokio::test]
    async fn delivers_in_publish_order() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(TOPIC);

        for i in 0..100 {
            assert_eq!(bus.publish(TOPIC, i), 1);
        }
        for i in 0..100 {
            assert_eq!(sub.recv().await, Some(i));
        }
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn publish_without_consumers_is_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(TOPIC, "lost"), 0);

        let mut sub = bus.subscribe(TOPIC);
        assert_eq!(sub.try_recv(), None);
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = EventBus::new();
        let mut created = bus.subscribe(TOPIC);
        let mut other = bus.subscribe("MESSAGE.DELETED");

        bus.publish(TOPIC, 1);
        assert_eq!(created.recv().await, Some(1));
        assert_eq!(other.try_recv(), None);
    }

    #[tokio::test]
    async fn unsubscribed_consumer_receives_nothing() {
        let bus = EventBus::new();
        let sub = bus.subscribe(TOPIC);
        let mut stays = bus.subscribe(TOPIC);
        assert_eq!(bus.subscriber_count(TOPIC), 2);

        bus.unsubscribe(sub);
        assert_eq!(bus.subscriber_count(TOPIC), 1);
        assert_eq!(bus.publish(TOPIC, 5), 1);
        assert_eq!(stays.recv().await, Some(5));
    }

    #[test]
    fn removing_a_consumer_twice_is_harmless() {
        let bus: EventBus<u32> = EventBus::new();
        let keep = bus.subscribe(TOPIC);
        let gone = bus.subscribe(TOPIC);
        let gone_id = gone.id();

        bus.unsubscribe(gone);
        assert!(!bus.inner.remove_consumer(TOPIC, gone_id));
        assert!(!bus.inner.remove_consumer(TOPIC, gone_id));
        assert_eq!(bus.subscriber_count(TOPIC), 1);

        assert!(bus.inner.remove_consumer(TOPIC, keep.id()));
        // Drop of `keep` now finds nothing left to remove.
        drop(keep);
        assert_eq!(bus.topic_count(), 0);
    }

    #[test]
    fn last_unsubscribe_drops_the_topic() {
        let bus: EventBus<u32> = EventBus::new();
        let a = bus.subscribe(TOPIC);
        let b = bus.subscribe(TOPIC);
        assert_eq!(bus.topic_count(), 1);

        drop(a);
        assert_eq!(bus.topic_count(), 1);
        drop(b);
        assert_eq!(bus.topic_count(), 0);
        assert_eq!(bus.subscriber_count(TOPIC), 0);
    }

    #[tokio::test]
    async fn each_consumer_gets_an_independent_sequence() {
        let bus = EventBus::new();
        let mut early = bus.subscribe(TOPIC);
        bus.publish(TOPIC, 1);
        let mut late = bus.subscribe(TOPIC);
        bus.publish(TOPIC, 2);

        // `late` drains without `early` reading anything.
        assert_eq!(late.recv().await, Some(2));
        assert_eq!(late.try_recv(), None);

        assert_eq!(early.recv().await, Some(1));
        assert_eq!(early.recv().await, Some(2));
    }

    #[tokio::test]
    async fn lagging_consumer_loses_oldest_payloads() {
        let bus = EventBus::with_capacity(2);
        let mut slow = bus.subscribe(TOPIC);

        for i in 1..=5 {
            bus.publish(TOPIC, i);
        }
        assert_eq!(slow.recv().await, Some(4));
        assert_eq!(slow.recv().await, Some(5));
        assert_eq!(slow.try_recv(), None);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let bus: EventBus<u8> = EventBus::with_capacity(0);
        assert_eq!(bus.capacity(), 1);
    }

    #[test]
    fn oversized_capacity_is_clamped() {
        let bus: EventBus<u8> = EventBus::with_capacity(usize::MAX / 2 + 2);
        assert_eq!(bus.capacity(), MAX_CAPACITY);

        let _sub = bus.subscribe(TOPIC);
        assert_eq!(bus.publish(TOPIC, 1), 1);
    }

    #[tokio::test]
    async fn capacity_reports_the_retained_window() {
        let bus = EventBus::with_capacity(3);
        assert_eq!(bus.capacity(), 4);

        let mut slow = bus.subscribe(TOPIC);
        for i in 1..=6 {
            bus.publish(TOPIC, i);
        }

        let mut retained = Vec::new();
        while let Some(payload) = slow.try_recv() {
            retained.push(payload);
        }
        assert_eq!(retained.len(), bus.capacity());
        assert_eq!(retained, vec![3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn concurrent_publishers_reach_every_consumer() {
        let bus = EventBus::new();
        let mut a = bus.subscribe(TOPIC);
        let mut b = bus.subscribe(TOPIC);

        let mut handles = Vec::new();
        for task in 0..4u32 {
            let bus = bus.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50u32 {
                    bus.publish(TOPIC, (task, i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for sub in [&mut a, &mut b] {
            let mut last_seen = [None::<u32>; 4];
            for _ in 0..200 {
                let (task, i) = sub.recv().await.unwrap();
                // Per publisher, order is preserved.
                let slot = &mut last_seen[task as usize];
                assert!(slot.is_none_or(|prev| prev < i));
                *slot = Some(i);
            }
            assert_eq!(sub.try_recv(), None);
        }
    }

    #[tokio::test]
    async fn dropping_the_stream_unsubscribes() {
        let bus = EventBus::new();
        let mut stream = Box::pin(bus.subscribe(TOPIC).into_stream());

        bus.publish(TOPIC, "first");
        let next = tokio::time::timeout(Duration::from_secs(1), stream.next()).await;
        assert_eq!(next.unwrap(), Some("first"));
        assert_eq!(bus.subscriber_count(TOPIC), 1);

        drop(stream);
        assert_eq!(bus.subscriber_count(TOPIC), 0);
        assert_eq!(bus.publish(TOPIC, "second"), 0);
    }

    #[tokio::test]
    async fn recv_ends_when_bus_is_gone() {
        let bus: EventBus<u8> = EventBus::new();
        let mut sub = bus.subscribe(TOPIC);
        drop(bus);
        assert_eq!(sub.recv().await, None);
    }
}
