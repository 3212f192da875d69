//! Chat prompt construction.

use crate::language::Lang;

/// System instruction sent with every translation.
pub const SYSTEM_PROMPT: &str = "You are a professional translator. \
Translate the user's text faithfully, preserving meaning, tone, formatting and line breaks. \
Reply with the translation only: no explanations, notes, quotes or transliterations.";

/// Language name as written in instructions.
///
/// "Catalan" is written as "Catalan (from Catalonia)".
pub fn prompt_language_name(lang: &Lang) -> String {
    let name = lang.display_name();
    if name == "Catalan" {
        format!("{name} (from Catalonia)")
    } else {
        name.to_string()
    }
}

/// Build the user instruction for one translation.
pub fn user_prompt(text: &str, source: &Lang, target: &Lang) -> String {
    let target_name = prompt_language_name(target);
    if source.is_auto() {
        format!(
            "Detect the language of the following text and translate it into {target_name}. \
Output only the translation.\n\n{text}"
        )
    } else {
        format!(
            "Translate the following text from {} into {target_name}. \
Output only the translation.\n\n{text}",
            prompt_language_name(source)
        )
    }
}
