//! Prompt templates for the image and text providers.
//!
//! Templates are stored in `templates/prompts/` and use Jinja2 syntax.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// Approximate length the optimizer is asked to expand a prompt to
const OPTIMIZER_TARGET_WORDS: u32 = 100;

/// Render the image prompt sent to the generation provider.
///
/// The user's description is wrapped with the house illustration style and
/// the optional category and tag names.
pub fn render_cover_prompt(
    description: &str,
    category: Option<&str>,
    tag: Option<&str>,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("description", Value::from(description.trim()));
    if let Some(category) = category {
        ctx.insert("category", Value::from(category));
    }
    if let Some(tag) = tag {
        ctx.insert("tag", Value::from(tag));
    }

    render_template("cover/style.jinja", &ctx)
}

/// Render the system prompt for prompt optimisation.
pub fn render_optimizer_system_prompt() -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("target_words", Value::from(OPTIMIZER_TARGET_WORDS));

    render_template("optimizer/system.jinja", &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_prompt_includes_description_and_theme() {
        let prompt = render_cover_prompt("  a fox reading  ", Some("Animals"), None).unwrap();
        assert!(prompt.starts_with("a fox reading."));
        assert!(prompt.contains("Animals theme"));
        assert!(!prompt.contains("  "));
    }

    #[test]
    fn test_cover_prompt_without_extras() {
        let prompt = render_cover_prompt("a lighthouse", None, None).unwrap();
        assert!(!prompt.contains("theme"));
        assert!(prompt.ends_with("no text."));
    }

    #[test]
    fn test_optimizer_system_prompt() {
        let prompt = render_optimizer_system_prompt().unwrap();
        assert!(prompt.contains("around 100 words"));
    }
}
