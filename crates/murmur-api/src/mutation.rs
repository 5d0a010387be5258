use async_graphql::{Context, ID, Object, Result};
use tracing::info;

use murmur_types::events::ChatEvent;

use crate::context::{ApiContext, viewer};
use crate::types::MessageObject;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Post a message as the current viewer and announce it on `MESSAGE.CREATED`.
    async fn create_message(&self, ctx: &Context<'_>, text: String) -> Result<MessageObject> {
        let api = ApiContext::from_ctx(ctx)?;
        let viewer = viewer(ctx)?;

        let message = api.store.create_message(&viewer.user_id, &text)?;

        let event = ChatEvent::message_created(message.clone());
        let delivered = api.bus.publish(event.topic(), event);
        info!(id = %message.id, author = %message.user_id, delivered, "message created");

        Ok(MessageObject(message))
    }

    /// Returns false if no message had this id. Publishes nothing.
    async fn delete_message(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let api = ApiContext::from_ctx(ctx)?;
        let removed = api.store.delete_message(&id)?;
        if removed {
            info!(id = %id.as_str(), "message deleted");
        }
        Ok(removed)
    }
}
