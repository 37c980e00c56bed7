use crate::stopwords::is_stopword;

/// Normalise extracted text for categorization: lowercase, drop numerals and
/// ASCII punctuation, then drop English stopwords.
pub fn preprocess_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_numeric() && !c.is_ascii_punctuation())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}
