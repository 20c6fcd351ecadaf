//! System prompt construction with catalog summary injection
//!
//! The remote model only sees utterances the local resolver could not
//! handle, so the prompt keeps it on topic and tells it what the shop stocks.

use crate::intent::Catalog;
use std::fmt::Write;

/// Base system prompt establishing the assistant's role
const BASE_PROMPT: &str = r"You are a friendly interior decoration assistant for a furniture showroom. Answer in the same language and dialect as the user (Egyptian Arabic or English). Keep answers short enough to be read aloud: two or three sentences, no markdown, no lists unless asked.

Users add furniture to a 3D scene by naming an item and a color, and send the scene with 'ابعت' or 'send'. If the user seems to want that, tell them how instead of pretending to do it.";

/// Build the system prompt for remote completions.
///
/// An override replaces the whole prompt, catalog summary included.
pub fn build_system_prompt(catalog: &Catalog, override_prompt: Option<&str>) -> String {
    if let Some(prompt) = override_prompt {
        return prompt.to_string();
    }

    let mut prompt = BASE_PROMPT.to_string();
    prompt.push_str("\n\n<catalog>\n");
    for category in &catalog.furniture {
        let _ = write!(prompt, "- {}", category.key);
        if let Some(english) = &category.english {
            let _ = write!(prompt, " ({english})");
        }
        prompt.push_str(":\n");
        for model in &category.models {
            let _ = writeln!(
                prompt,
                "  - {}: colors {}; materials {}",
                model.name,
                join_or_dash(&model.colors),
                join_or_dash(&model.materials)
            );
        }
    }
    prompt.push_str("</catalog>");
    prompt
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_lists_catalog() {
        let catalog = Catalog::builtin();
        let prompt = build_system_prompt(&catalog, None);

        assert!(prompt.starts_with(BASE_PROMPT));
        assert!(prompt.contains("<catalog>"));
        for category in &catalog.furniture {
            assert!(prompt.contains(&format!("- {}", category.key)));
            for model in &category.models {
                assert!(prompt.contains(&model.name));
            }
        }
        assert!(prompt.ends_with("</catalog>"));
    }

    #[test]
    fn test_override_replaces_everything() {
        let prompt = build_system_prompt(&Catalog::builtin(), Some("Only say hello."));
        assert_eq!(prompt, "Only say hello.");
    }
}
