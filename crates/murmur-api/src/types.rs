use async_graphql::{Context, Error, ID, Object, Result, SimpleObject};

use murmur_types::events::MessageCreated;
use murmur_types::models::{Message, User};

use crate::context::ApiContext;

pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    /// Every message this user owns.
    async fn messages(&self, ctx: &Context<'_>) -> Result<Option<Vec<MessageObject>>> {
        let api = ApiContext::from_ctx(ctx)?;
        let messages = api.store.messages_by_user(&self.0.id)?;
        Ok(Some(messages.into_iter().map(MessageObject).collect()))
    }
}

pub struct MessageObject(pub Message);

#[Object(name = "Message")]
impl MessageObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn text(&self) -> &str {
        &self.0.text
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let api = ApiContext::from_ctx(ctx)?;
        api.store
            .user(&self.0.user_id)?
            .map(UserObject)
            .ok_or_else(|| Error::new(format!("user {} not found", self.0.user_id)))
    }
}

#[derive(SimpleObject)]
#[graphql(name = "MessageCreated")]
pub struct MessageCreatedObject {
    pub message: MessageObject,
}

impl From<MessageCreated> for MessageCreatedObject {
    fn from(event: MessageCreated) -> Self {
        Self {
            message: MessageObject(event.message),
        }
    }
}
