//! Initials derivation from page titles
//!
//! Produces the 1–2 character abbreviation rendered inside the icon.
//! Guarantee: the result is always 1–2 uppercase alphanumeric characters,
//! never empty, whatever the title looks like.

/// Words carrying no branding signal, dropped before taking initials.
const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "a", "an", "&",
];

/// Character used when a title yields nothing usable.
pub const PLACEHOLDER: char = 'W';

/// Derive up to two uppercase alphanumeric initials from a title.
pub fn derive_initials(title: &str) -> String {
    // Keep word characters, hyphens and separators; everything else
    // becomes a space so it can only split words, never join them.
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words: Vec<&str> = cleaned
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '.')
        .filter(|w| !w.is_empty())
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    let mut initials = String::new();
    for word in words.iter().take(2) {
        if let Some(first) = word.chars().next() {
            let upper = first.to_uppercase().next().unwrap_or(first);
            if upper.is_ascii_alphanumeric() {
                initials.push(upper);
            }
        }
    }

    // Thin harvest from the word pass: fall back to capitals and digits
    // anywhere in the raw title.
    if initials.len() < 2 {
        let capitals: String = title
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            .take(2)
            .collect();
        if !capitals.is_empty() {
            initials = capitals;
        }
    }

    // Last resort: first two raw characters, placeholder for anything
    // that is not alphanumeric.
    if initials.is_empty() {
        initials = title
            .chars()
            .take(2)
            .map(|c| {
                let upper = c.to_ascii_uppercase();
                if upper.is_ascii_alphanumeric() {
                    upper
                } else {
                    PLACEHOLDER
                }
            })
            .collect();
    }

    if initials.is_empty() {
        initials.push(PLACEHOLDER);
    }

    initials
}
