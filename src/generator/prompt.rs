//! Prompt construction for the generative backend

use crate::Language;

/// Build the role-instruction prompt for a user turn
///
/// The user text is embedded verbatim. Bengali turns carry an explicit
/// instruction to answer in Bengali; English turns get no language
/// instruction.
#[must_use]
pub fn build_prompt(user_text: &str, language: Language) -> String {
    match language {
        Language::Bn => format!(
            "You are Jarvis, an AI assistant. The user is speaking in Bengali.\n\
             Please respond in Bengali. User input: {user_text}\n\n\
             Provide a helpful, friendly response in Bengali. Keep it concise and natural."
        ),
        Language::En => format!(
            "You are Jarvis, an AI assistant. The user said: {user_text}\n\n\
             Provide a helpful, friendly response. Keep it concise and natural."
        ),
    }
}
