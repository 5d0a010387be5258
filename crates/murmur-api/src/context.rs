use std::sync::Arc;

use async_graphql::{Context, Result};

use murmur_bus::EventBus;
use murmur_store::Store;
use murmur_types::events::ChatEvent;
use murmur_types::models::Viewer;

pub type ChatBus = EventBus<ChatEvent>;

#[derive(Debug, Clone, Copy)]
pub struct ApiOptions {
    /// Re-publish the seed message whenever a `messageCreated` subscription
    /// starts. Only subscribers already connected see it.
    pub replay_seed_on_subscribe: bool,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            replay_seed_on_subscribe: true,
        }
    }
}

/// Shared state handed to every resolver through the schema data.
pub struct ApiContext {
    pub store: Arc<Store>,
    pub bus: ChatBus,
    pub options: ApiOptions,
}

impl ApiContext {
    pub fn from_ctx<'a>(ctx: &Context<'a>) -> Result<&'a Arc<ApiContext>> {
        ctx.data::<Arc<ApiContext>>()
    }
}

/// The identity attached to the current request or connection.
pub fn viewer<'a>(ctx: &Context<'a>) -> Result<&'a Viewer> {
    ctx.data::<Viewer>()
}
