//! Merging retrieved knowledge into the user's message.

use ragkit_core::{Message, Role};

use crate::error::{RagError, Result};

/// Appended to every merged user message.
pub const ANSWER_INSTRUCTION: &str =
    "Answer the question using only the context above. Do not mention the source or the context itself.";

/// Rewrites the user turn of a conversation so it carries retrieved context.
///
/// The System message at index 0 is never touched. The rewritten message is
/// the last User message of the conversation, which for the usual
/// `[system, user]` pair is index 1. Everything else is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct PromptMerger;

impl PromptMerger {
    /// Create a merger.
    pub fn new() -> Self {
        Self
    }

    /// Merge `knowledge` into the conversation.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InsufficientContext`] if there are fewer than two
    /// messages, the first is not a System message, or no User message follows it.
    pub fn merge(&self, mut messages: Vec<Message>, knowledge: &str) -> Result<Vec<Message>> {
        let index = user_message_index(&messages)?;
        let user = &mut messages[index];
        user.content = merged_content(&user.content, knowledge);
        Ok(messages)
    }
}

/// Locate the User message the pipeline works on.
///
/// Shared by retrieval (to read the query) and merging (to rewrite it) so both
/// agree on which message is "the" user query.
pub fn user_message_index(messages: &[Message]) -> Result<usize> {
    if messages.len() < 2 {
        return Err(RagError::InsufficientContext(format!(
            "expected at least 2 messages, got {}",
            messages.len()
        )));
    }
    if messages[0].role != Role::System {
        return Err(RagError::InsufficientContext(format!(
            "first message must be a system message, got {}",
            messages[0].role.as_str()
        )));
    }
    messages
        .iter()
        .rposition(|m| m.role == Role::User)
        .filter(|&i| i > 0)
        .ok_or_else(|| RagError::InsufficientContext("no user message found".to_string()))
}

fn merged_content(original: &str, knowledge: &str) -> String {
    format!("user query: {original}\nContext knowledge: {knowledge}\n{ANSWER_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Vec<Message> {
        vec![Message::system("You are a support agent."), Message::user("What is the phone?")]
    }

    #[test]
    fn rewrites_user_message_and_keeps_system() {
        let merged = PromptMerger::new().merge(conversation(), "Contact phone: 555-0100").unwrap();

        assert_eq!(merged[0], Message::system("You are a support agent."));
        assert_eq!(
            merged[1].content,
            format!(
                "user query: What is the phone?\nContext knowledge: Contact phone: 555-0100\n{ANSWER_INSTRUCTION}"
            )
        );
    }

    #[test]
    fn merge_is_deterministic() {
        let merger = PromptMerger::new();
        let a = merger.merge(conversation(), "k").unwrap();
        let b = merger.merge(conversation(), "k").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_message_is_insufficient() {
        let err = PromptMerger::new().merge(vec![Message::system("s")], "k").unwrap_err();
        assert!(matches!(err, RagError::InsufficientContext(_)));
    }

    #[test]
    fn missing_system_message_is_insufficient() {
        let err = PromptMerger::new()
            .merge(vec![Message::user("a"), Message::user("b")], "k")
            .unwrap_err();
        assert!(matches!(err, RagError::InsufficientContext(_)));
    }

    #[test]
    fn rewrites_last_user_message_in_history() {
        let messages = vec![
            Message::system("s"),
            Message::user("first question"),
            Message::assistant("first answer"),
            Message::user("follow-up"),
        ];
        let merged = PromptMerger::new().merge(messages.clone(), "k").unwrap();

        assert_eq!(merged[1], messages[1]);
        assert_eq!(merged[2], messages[2]);
        assert!(merged[3].content.starts_with("user query: follow-up\n"));
    }
}
