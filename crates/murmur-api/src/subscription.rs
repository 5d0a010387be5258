use async_graphql::{Context, Result, Subscription};
use futures_util::{Stream, StreamExt};
use tracing::debug;

use murmur_store::seed::SEED_MESSAGE_ID;
use murmur_types::events::{ChatEvent, topics};

use crate::context::ApiContext;
use crate::types::MessageCreatedObject;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Messages created from the moment of subscribing. Closing the
    /// connection unsubscribes.
    async fn message_created(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = MessageCreatedObject>> {
        let api = ApiContext::from_ctx(ctx)?;

        if api.options.replay_seed_on_subscribe {
            if let Some(seed) = api.store.message(SEED_MESSAGE_ID)? {
                let event = ChatEvent::message_created(seed);
                let delivered = api.bus.publish(event.topic(), event);
                debug!(delivered, "seed message replayed");
            }
        }

        let subscription = api.bus.subscribe(topics::MESSAGE_CREATED);
        Ok(subscription.into_stream().map(|event| match event {
            ChatEvent::MessageCreated(created) => MessageCreatedObject::from(created),
        }))
    }
}
