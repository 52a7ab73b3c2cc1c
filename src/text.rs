/// Flatten a free-text field for display: newlines become spaces and the
/// result is trimmed. Absent input yields an empty string.
pub fn clean(text: Option<&str>) -> String {
    match text {
        Some(t) => t.replace('\n', " ").trim().to_string(),
        None => String::new(),
    }
}

/// Collapse every whitespace run to a single space. Display only; dedup
/// keys keep the provider's spacing.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased copy of `text` keeping only word characters, whitespace and
/// hyphens. Only used for keyword matching.
pub fn normalize_for_matching(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .to_lowercase()
}
