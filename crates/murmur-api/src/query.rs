use async_graphql::{Context, Error, ID, Object, Result};

use crate::context::{ApiContext, viewer};
use crate::types::{MessageObject, UserObject};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The user the request is made as.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<UserObject>> {
        let api = ApiContext::from_ctx(ctx)?;
        let viewer = viewer(ctx)?;
        Ok(api.store.user(&viewer.user_id)?.map(UserObject))
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<UserObject>> {
        let api = ApiContext::from_ctx(ctx)?;
        Ok(api.store.user(&id)?.map(UserObject))
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Option<Vec<UserObject>>> {
        let api = ApiContext::from_ctx(ctx)?;
        let users = api.store.users()?;
        Ok(Some(users.into_iter().map(UserObject).collect()))
    }

    async fn messages(&self, ctx: &Context<'_>) -> Result<Vec<MessageObject>> {
        let api = ApiContext::from_ctx(ctx)?;
        let messages = api.store.messages()?;
        Ok(messages.into_iter().map(MessageObject).collect())
    }

    /// Non-null, so a missing message is reported as a field error.
    async fn message(&self, ctx: &Context<'_>, id: ID) -> Result<MessageObject> {
        let api = ApiContext::from_ctx(ctx)?;
        api.store
            .message(&id)?
            .map(MessageObject)
            .ok_or_else(|| Error::new(format!("message {} not found", id.as_str())))
    }
}
