use std::sync::Arc;

use async_graphql::Schema;

use murmur_store::Store;

use crate::context::{ApiContext, ApiOptions, ChatBus};
use crate::mutation::MutationRoot;
use crate::query::QueryRoot;
use crate::subscription::SubscriptionRoot;

pub type ChatSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the schema. Callers attach a `Viewer` to each request.
pub fn build_schema(store: Arc<Store>, bus: ChatBus, options: ApiOptions) -> ChatSchema {
    let ctx = Arc::new(ApiContext {
        store,
        bus,
        options,
    });

    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(ctx)
        .finish()
}
