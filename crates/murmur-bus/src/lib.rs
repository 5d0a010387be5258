//! In-process publish/subscribe keyed by topic.
//!
//! Every topic owns a bounded ring buffer shared by its consumers. Publishers
//! never wait: a consumer that falls more than `capacity` payloads behind
//! loses the oldest ones and carries on from the oldest payload still held.
//! The capacity is always a power of two no larger than [`MAX_CAPACITY`].

mod bus;
mod subscription;

pub use bus::{ConsumerId, DEFAULT_CAPACITY, EventBus, MAX_CAPACITY};
pub use subscription::Subscription;
