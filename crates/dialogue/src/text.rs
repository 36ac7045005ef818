//! Free-text normalisation and word-boundary phrase matching.
//!
//! Shared by slot interpretation and explicit genre detection so both see
//! the same tokenisation.

/// Lowercase, fold punctuation to spaces and collapse whitespace.
///
/// Apostrophes and hyphens survive so "children's" and "sci-fi" stay one
/// token; typographic variants of both are folded to their ASCII forms.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            c if c.is_alphanumeric() || c == '\'' || c == '-' => c,
            _ => ' ',
        })
        .flat_map(char::to_lowercase)
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset of `phrase` in already-normalised `text`, matched on whole
/// words only.
pub fn find_phrase(normalized_text: &str, phrase: &str) -> Option<usize> {
    let needle = normalize(phrase);
    if needle.is_empty() {
        return None;
    }
    let haystack = format!(" {normalized_text} ");
    haystack.find(&format!(" {needle} "))
}

pub fn contains_phrase(normalized_text: &str, phrase: &str) -> bool {
    find_phrase(normalized_text, phrase).is_some()
}
