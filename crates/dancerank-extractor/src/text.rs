//! Input text cleaning

/// Characters replaced by a space before splitting into words
const SEPARATORS: &[char] = &['.', ',', '_', ';', ':', '&', '(', ')', '!', '?', '"', '/'];

/// Replace separator characters with spaces and split into words
pub fn clean_text(text: &str) -> Vec<String> {
    text.replace(SEPARATORS, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
