//! Styling of guide replies
//!
//! The guide tags the sections of a verse explanation with `<sanskrit>`,
//! `<transliteration>`, `<translation>` and `<example>`. A reply carrying a
//! `<sanskrit>` tag is rewritten into styled `div` containers; anything else
//! is returned untouched.
//!
//! Substitution is literal and per tag: no nesting awareness, no balancing,
//! no escaping. Unmatched tags stay in the output as written. The styled
//! output is trusted markup and is rendered without escaping.

use std::borrow::Cow;

/// Presence of this tag selects the styled path
pub const SANSKRIT_TAG: &str = "<sanskrit>";

/// Transliteration deliberately shares the translation container.
const SUBSTITUTIONS: [(&str, &str); 8] = [
    (SANSKRIT_TAG, "<div class='sanskrit'>"),
    ("</sanskrit>", "</div>"),
    ("<transliteration>", "<div class='translation'>"),
    ("</transliteration>", "</div>"),
    ("<translation>", "<div class='translation'>"),
    ("</translation>", "</div>"),
    ("<example>", "<div class='example'>📝 Modern Application:<br>"),
    ("</example>", "</div>"),
];

/// Whether `content` takes the styled path
pub fn is_styled(content: &str) -> bool {
    content.contains(SANSKRIT_TAG)
}

/// Map raw model output to display markup.
pub fn format_response(content: &str) -> Cow<'_, str> {
    if !is_styled(content) {
        return Cow::Borrowed(content);
    }

    let markup = SUBSTITUTIONS
        .iter()
        .fold(content.to_string(), |acc, (tag, replacement)| {
            acc.replace(tag, replacement)
        });
    Cow::Owned(markup)
}
