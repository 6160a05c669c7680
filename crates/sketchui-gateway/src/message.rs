//! Typed chat message model
//!
//! Serializes to the chat-completions wire shape:
//!
//! ```text
//! {"role":"user","content":[
//!     {"type":"text","text":"..."},
//!     {"type":"image_url","image_url":{"url":"data:image/png;base64,..."}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions
    System,
    /// Caller input
    User,
    /// Model output (for multi-turn context)
    Assistant,
}

/// Image reference (URL or `data:` URI)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Target of the reference
    pub url: String,
}

/// One block of a mixed-content message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text {
        /// Block body
        text: String,
    },
    /// Image reference
    ImageUrl {
        /// Referenced image
        image_url: ImageUrl,
    },
}

impl ContentBlock {
    /// Text block
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image block
    #[inline]
    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Message content: a bare string or a list of blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Single text string
    Text(String),
    /// Ordered text and image blocks
    Blocks(Vec<ContentBlock>),
}

/// Role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Body
    pub content: MessageContent,
}

impl ChatMessage {
    /// System message with text content
    #[inline]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message with text content
    #[inline]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message carrying text followed by an image reference
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(vec![
                ContentBlock::text(text),
                ContentBlock::image(image_url),
            ]),
        }
    }

    /// Image references carried by this message
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        let blocks: &[ContentBlock] = match &self.content {
            MessageContent::Blocks(blocks) => blocks,
            MessageContent::Text(_) => &[],
        };
        blocks.iter().filter_map(|block| match block {
            ContentBlock::ImageUrl { image_url } => Some(image_url.url.as_str()),
            ContentBlock::Text { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_message_serializes_as_string_content() {
        let value = serde_json::to_value(ChatMessage::system("be terse")).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "be terse"}));
    }

    #[test]
    fn mixed_user_message_wire_shape() {
        let message = ChatMessage::user_with_image("describe", "data:image/png;base64,AAAA");
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "describe"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                ]
            })
        );
    }

    #[test]
    fn deserializes_both_content_forms() {
        let text: ChatMessage =
            serde_json::from_value(json!({"role": "assistant", "content": "ok"})).unwrap();
        assert_eq!(text.content, MessageContent::Text("ok".to_string()));

        let blocks: ChatMessage = serde_json::from_value(json!({
            "role": "user",
            "content": [{"type": "image_url", "image_url": {"url": "x"}}]
        }))
        .unwrap();
        assert_eq!(blocks.image_urls().collect::<Vec<_>>(), vec!["x"]);
    }
}
