//! Prompt assembly: system instruction, prior turns, then the new question.

use serde::{Deserialize, Serialize};

use studybot_core::types::Role;

/// Role of a message inside a structured prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
        }
    }
}

/// One role-tagged message, in the shape chat-completion APIs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered sequence of messages sent to the completion provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredPrompt {
    pub messages: Vec<PromptMessage>,
}

impl StructuredPrompt {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptMessage> {
        self.messages.iter()
    }
}

/// Build `[system] + history + [question]` with nothing dropped or reordered.
pub fn build_prompt(
    system_instruction: &str,
    history: &[(Role, String)],
    question: &str,
) -> StructuredPrompt {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(PromptMessage::new(PromptRole::System, system_instruction));
    messages.extend(
        history
            .iter()
            .map(|(role, message)| PromptMessage::new((*role).into(), message.clone())),
    );
    messages.push(PromptMessage::new(PromptRole::User, question));
    StructuredPrompt { messages }
}

/// Prompt builder bound to the configured persona and history window.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_instruction: String,
    max_history_turns: Option<usize>,
}

impl PromptAssembler {
    /// Assembler that always includes the full history.
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            max_history_turns: None,
        }
    }

    /// Keep only the most recent `limit` history turns. `None` keeps all.
    pub fn with_max_history_turns(mut self, limit: Option<usize>) -> Self {
        self.max_history_turns = limit;
        self
    }

    pub fn assemble(&self, history: &[(Role, String)], question: &str) -> StructuredPrompt {
        let window = match self.max_history_turns {
            Some(limit) if history.len() > limit => &history[history.len() - limit..],
            _ => history,
        };
        build_prompt(&self.system_instruction, window, question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(pairs: &[(Role, &str)]) -> Vec<(Role, String)> {
        pairs.iter().map(|(r, m)| (*r, m.to_string())).collect()
    }

    #[test]
    fn test_empty_history() {
        let prompt = build_prompt("persona", &[], "What is 2+2?");
        assert_eq!(
            prompt.messages,
            vec![
                PromptMessage::new(PromptRole::System, "persona"),
                PromptMessage::new(PromptRole::User, "What is 2+2?"),
            ]
        );
    }

    #[test]
    fn test_history_order_preserved() {
        let prior = history(&[(Role::User, "hi"), (Role::Assistant, "hello")]);
        let prompt = build_prompt("persona", &prior, "continue");

        let roles: Vec<PromptRole> = prompt.iter().map(|m| m.role).collect();
        let contents: Vec<&str> = prompt.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            roles,
            vec![
                PromptRole::System,
                PromptRole::User,
                PromptRole::Assistant,
                PromptRole::User,
            ]
        );
        assert_eq!(contents, vec!["persona", "hi", "hello", "continue"]);
    }

    #[test]
    fn test_no_deduplication() {
        let prior = history(&[
            (Role::User, "same"),
            (Role::Assistant, "same"),
            (Role::User, "same"),
        ]);
        let prompt = build_prompt("p", &prior, "same");
        assert_eq!(prompt.len(), 5);
    }

    #[test]
    fn test_system_instruction_is_opaque() {
        let odd = "{history}\n\n  {question}  ";
        let prompt = build_prompt(odd, &[], "q");
        assert_eq!(prompt.messages[0].content, odd);
    }

    #[test]
    fn test_assembler_without_limit_matches_build_prompt() {
        let prior = history(&[
            (Role::User, "a"),
            (Role::Assistant, "b"),
            (Role::User, "c"),
            (Role::Assistant, "d"),
        ]);
        let assembler = PromptAssembler::new("persona");
        assert_eq!(
            assembler.assemble(&prior, "e"),
            build_prompt("persona", &prior, "e")
        );
    }

    #[test]
    fn test_assembler_window_keeps_most_recent() {
        let prior = history(&[
            (Role::User, "a"),
            (Role::Assistant, "b"),
            (Role::User, "c"),
            (Role::Assistant, "d"),
        ]);
        let assembler = PromptAssembler::new("persona").with_max_history_turns(Some(2));
        let prompt = assembler.assemble(&prior, "e");
        let contents: Vec<&str> = prompt.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["persona", "c", "d", "e"]);
    }

    #[test]
    fn test_assembler_window_zero_and_larger_than_history() {
        let prior = history(&[(Role::User, "a"), (Role::Assistant, "b")]);

        let zero = PromptAssembler::new("p").with_max_history_turns(Some(0));
        assert_eq!(zero.assemble(&prior, "q").len(), 2);

        let wide = PromptAssembler::new("p").with_max_history_turns(Some(10));
        assert_eq!(wide.assemble(&prior, "q").len(), 4);
    }

    #[test]
    fn test_prompt_serializes_as_message_array() {
        let prompt = build_prompt("p", &history(&[(Role::Assistant, "x")]), "q");
        let value = serde_json::to_value(&prompt).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"role": "system", "content": "p"},
                {"role": "assistant", "content": "x"},
                {"role": "user", "content": "q"},
            ])
        );
    }
}
