use crate::telegram::{ChatTransport, InlineKeyboardMarkup, TransportError};

/// Answer target for one update: the chat, plus the message to edit when the
/// update came from an inline button.
#[derive(Clone, Copy)]
pub struct Reply<'a> {
    transport: &'a dyn ChatTransport,
    pub chat_id: i64,
    message_id: Option<i64>,
}

impl<'a> Reply<'a> {
    pub fn new(transport: &'a dyn ChatTransport, chat_id: i64, message_id: Option<i64>) -> Self {
        Self {
            transport,
            chat_id,
            message_id,
        }
    }

    pub fn transport(&self) -> &'a dyn ChatTransport {
        self.transport
    }

    /// Edits the originating message when there is one, otherwise sends.
    pub async fn show(
        &self,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        if let Some(message_id) = self.message_id {
            match self
                .transport
                .edit_message_text(self.chat_id, message_id, text, keyboard)
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(chat_id = self.chat_id, error = %err, "edit failed, sending instead");
                }
            }
        }
        self.send(text, keyboard).await
    }

    pub async fn send(
        &self,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        self.transport
            .send_message(self.chat_id, text, keyboard)
            .await
            .map(|_| ())
    }

    /// Sends a photo card, or a plain message when the product has no image.
    pub async fn send_card(
        &self,
        photo: Option<&str>,
        caption: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        match photo {
            Some(photo) => self
                .transport
                .send_photo(self.chat_id, photo, caption, keyboard)
                .await
                .map(|_| ()),
            None => self.send(caption, keyboard).await,
        }
    }

    /// Drops the originating message; used before a run of new messages.
    pub async fn remove_origin(&self) {
        let Some(message_id) = self.message_id else {
            return;
        };
        if let Err(err) = self.transport.delete_message(self.chat_id, message_id).await {
            tracing::debug!(chat_id = self.chat_id, error = %err, "delete failed");
        }
    }
}
