//! Chat prompt templates with `{name}` placeholders.

use std::collections::HashMap;

use ragkit_core::{Message, Role};

use crate::error::{RagError, Result};

/// A sequence of message templates rendered against a variable map.
///
/// Placeholders use `{name}`; `{{` and `}}` produce literal braces. Every
/// placeholder must have a value, otherwise rendering fails with
/// [`RagError::Template`].
///
/// # Example
///
/// ```rust,ignore
/// let template = ChatTemplate::new()
///     .system("You are a customer service agent.")
///     .user("{task}");
/// let messages = template.render(&HashMap::from([("task".into(), "Hi".into())]))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTemplate {
    messages: Vec<(Role, String)>,
}

impl ChatTemplate {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message template with the given role.
    pub fn message(mut self, role: Role, template: impl Into<String>) -> Self {
        self.messages.push((role, template.into()));
        self
    }

    /// Append a system message template.
    pub fn system(self, template: impl Into<String>) -> Self {
        self.message(Role::System, template)
    }

    /// Append a user message template.
    pub fn user(self, template: impl Into<String>) -> Self {
        self.message(Role::User, template)
    }

    /// Render every message template.
    pub fn render(&self, variables: &HashMap<String, String>) -> Result<Vec<Message>> {
        self.messages
            .iter()
            .map(|(role, template)| Ok(Message::new(*role, format_template(template, variables)?)))
            .collect()
    }
}

fn format_template(template: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(RagError::Template(format!(
                                "unclosed placeholder '{{{name}' in template"
                            )));
                        }
                    }
                }
                let value = variables.get(name.trim()).ok_or_else(|| {
                    RagError::Template(format!("missing value for placeholder '{}'", name.trim()))
                })?;
                out.push_str(value);
            }
            '}' => return Err(RagError::Template("unmatched '}' in template".to_string())),
            _ => out.push(c),
        }
    }

    Ok(out)
}
