//! Prompt construction for the guide conversation
//!
//! The system instruction is fixed. Each request replays the remembered
//! exchanges as a plain-text transcript and ends with an open `Guide:` line
//! for the model to complete.

use std::fmt::Write;

/// System instruction establishing the guide's role and reply format
pub const SYSTEM_PROMPT: &str = r"You are a knowledgeable Bhagavad Gita guide powered by the Deepseek model.
When users ask about specific chapters and verses:
1. First provide the Sanskrit verse with proper formatting
2. Then provide the English transliteration
3. Follow with a clear translation
4. Finally, give a modern-day example or application
5. If the verse number isn't specified, provide a summary of the chapter
Format your response using HTML-like tags for styling:
<sanskrit>Sanskrit text</sanskrit>
<transliteration>Transliterated text</transliteration>
<translation>English translation</translation>
<example>Modern example</example>";

/// Generation stops if the model starts writing either side of a new exchange
pub const STOP_SEQUENCES: [&str; 2] = ["Human:", "Assistant:"];

pub const SEEKER_PREFIX: &str = "Seeker";
pub const GUIDE_PREFIX: &str = "Guide";

const CONVERSATION_HEADER: &str = "Current conversation:";

/// Build the prompt for `input` given earlier `(seeker, guide)` exchanges.
pub fn conversation_prompt<'a>(
    history: impl IntoIterator<Item = (&'a str, &'a str)>,
    input: &str,
) -> String {
    let mut prompt = String::from(CONVERSATION_HEADER);
    prompt.push('\n');

    for (seeker, guide) in history {
        let _ = writeln!(prompt, "{SEEKER_PREFIX}: {seeker}");
        let _ = writeln!(prompt, "{GUIDE_PREFIX}: {guide}");
    }

    let _ = writeln!(prompt, "{SEEKER_PREFIX}: {input}");
    let _ = write!(prompt, "{GUIDE_PREFIX}:");
    prompt
}
