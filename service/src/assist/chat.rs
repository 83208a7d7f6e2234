//! [`Assist`] operation replying to a support chat.

use std::convert::Infallible;

use tracing as log;

use crate::{
    domain::property,
    infra::{assist, Assistant},
    Service,
};

use super::Assist;

/// [`Assist`] operation replying to a support chat.
#[derive(Clone, Debug)]
pub struct Chat {
    /// Recent chat history, oldest turn first.
    pub history: Vec<assist::ChatMessage>,

    /// City the user is searching in, if known.
    pub city: Option<property::City>,
}

impl<Db> Assist<Chat> for Service<Db> {
    type Ok = String;
    type Err = Infallible;

    /// Replies to the chat, falling back to
    /// [`Assistant::CHAT_FALLBACK`] on any upstream failure: the chat UI
    /// must never see a hard error.
    async fn execute(&self, op: Chat) -> Result<Self::Ok, Self::Err> {
        let Chat { history, city } = op;

        Ok(self
            .assistant()
            .chat(&history, city.as_ref())
            .await
            .unwrap_or_else(|e| {
                log::warn!("chat assistant unavailable: {e}");
                Assistant::CHAT_FALLBACK.to_owned()
            }))
    }
}
