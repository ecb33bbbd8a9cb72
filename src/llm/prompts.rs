//! Prompt templates for RAG queries

use std::collections::HashMap;

use tracing::warn;

/// Instructions sent as the system prompt when the caller supplies none
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the provided context. \
Use only the information from the context to answer questions. If the context doesn't contain \
enough information to answer the question, say so politely.";

/// Placeholder used in place of context when retrieval found nothing
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found.";

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables.
    ///
    /// Substitution is single-pass: a value that itself contains `{{name}}`
    /// is inserted verbatim. Placeholders without a value are left as-is.
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let missing = self.missing_variables(values);
        if !missing.is_empty() {
            warn!("Prompt rendered without values for: {}", missing.join(", "));
        }

        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            match after_open.find("}}") {
                Some(close) => {
                    let name = &after_open[..close];
                    match values.get(name) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(name);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);

        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Required variables that `values` does not supply, in template order
    #[must_use]
    pub fn missing_variables(&self, values: &HashMap<String, String>) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|name| !values.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Standard RAG prompt templates
pub struct RagPrompts;

impl RagPrompts {
    /// Context-grounded question answering
    #[must_use]
    pub fn context_qa() -> PromptTemplate {
        PromptTemplate::new("Context: {{context}}\n\nQuestion: {{question}}")
    }

    /// Build the user prompt from retrieved passages and the question.
    ///
    /// Passages are separated by a blank line; with no passages the
    /// [`NO_CONTEXT_SENTINEL`] stands in for the context.
    #[must_use]
    pub fn build_context_prompt(context: &[String], question: &str) -> String {
        let context_text = if context.is_empty() {
            NO_CONTEXT_SENTINEL.to_string()
        } else {
            context.join("\n\n")
        };

        let mut values = HashMap::new();
        values.insert("context".to_string(), context_text);
        values.insert("question".to_string(), question.to_string());
        Self::context_qa().render(&values)
    }
}
