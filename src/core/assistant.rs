//! Prompt assembly for the completion backend.
//!

use crate::core::conversation::{Message, Sender};
use minijinja::context;
use std::sync::LazyLock;

/// Instructions prepended to every completion request.
pub const SYSTEM_PROMPT: &str = "You are a helpful, friendly, and knowledgeable AI assistant. You provide clear, concise, and accurate responses. You're conversational but professional, and you always try to be helpful while being honest about your limitations. Keep your responses focused and not too lengthy unless specifically asked for detailed explanations.";

/// The backend takes one opaque prompt string: system instructions, then the
/// transcript as role-tagged lines, then the cue for the next reply.
const PROMPT_TEMPLATE: &str = r#"{{ system_prompt }}

Conversation:
{% for message in messages %}{{ message.role }}: {{ message.content }}
{% endfor %}
Assistant:"#;

static PROMPT_ENV: LazyLock<minijinja::Environment<'static>> = LazyLock::new(|| {
    let mut env = minijinja::Environment::new();
    env.set_trim_blocks(true);
    env.add_template("prompt", PROMPT_TEMPLATE)
        .expect("prompt template should parse");
    env
});

#[derive(Debug, Clone)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn as_jinja_value(&self) -> minijinja::Value {
        minijinja::context! {
            role => match self.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            },
            content => self.content
        }
    }
}

#[derive(Debug, Clone)]
pub enum Role {
    User,
    Assistant,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            content: message.content.clone(),
            role: match message.sender {
                Sender::User => Role::User,
                Sender::Bot => Role::Assistant,
            },
        }
    }
}

/// Renders the single prompt string sent to the completion backend.
pub fn render_prompt(system_prompt: &str, messages: &[ChatMessage]) -> String {
    let messages: Vec<minijinja::Value> = messages.iter().map(|m| m.as_jinja_value()).collect();

    PROMPT_ENV
        .get_template("prompt")
        .expect("prompt template should be registered")
        .render(context! {
            system_prompt => system_prompt,
            messages => messages
        })
        .expect("prompt rendering should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn message(sender: Sender, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            content: content.to_owned(),
            sender,
            timestamp: Utc::now(),
            is_loading: false,
        }
    }

    #[test]
    fn test_chat_message_from_user_message() {
        let chat_message: ChatMessage = (&message(Sender::User, "Hello")).into();
        assert!(matches!(chat_message.role, Role::User));
        assert_eq!(chat_message.content, "Hello");
    }

    #[test]
    fn test_chat_message_from_bot_message() {
        let chat_message: ChatMessage = (&message(Sender::Bot, "Hi there!")).into();
        assert!(matches!(chat_message.role, Role::Assistant));
        assert_eq!(chat_message.content, "Hi there!");
    }

    #[test]
    fn test_chat_message_as_jinja_value() {
        let chat_message = ChatMessage {
            role: Role::User,
            content: "Test message".to_owned(),
        };
        assert!(chat_message.as_jinja_value().as_object().is_some());
    }

    #[test]
    fn test_render_prompt_tags_roles() {
        let transcript: Vec<ChatMessage> = [
            message(Sender::User, "What is Rust?"),
            message(Sender::Bot, "A systems language."),
            message(Sender::User, "Thanks!"),
        ]
        .iter()
        .map(ChatMessage::from)
        .collect();

        let prompt = render_prompt("Be helpful.", &transcript);

        assert!(prompt.starts_with("Be helpful.\n\nConversation:\n"));
        assert!(prompt.contains("User: What is Rust?\n"));
        assert!(prompt.contains("Assistant: A systems language.\n"));
        assert!(prompt.ends_with("Assistant:"));
    }

    #[test]
    fn test_render_prompt_with_empty_transcript() {
        let prompt = render_prompt(SYSTEM_PROMPT, &[]);
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.ends_with("Assistant:"));
    }
}
