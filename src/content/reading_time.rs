//! Reading time estimation

/// Average reading speed the estimate is based on
const WORDS_PER_MINUTE: usize = 200;

/// Estimate how long a body takes to read, as a short human string
/// ("3 min read").
///
/// Rounded up to whole minutes. A body with no countable words still
/// reports "1 min read" so every item renders a non-empty label.
pub fn estimate(body: &str) -> String {
    let minutes = count_words(body).div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Count words in a markdown body.
///
/// A run of ASCII alphanumerics counts as one word; CJK ideographs count
/// one each since they are not space-separated.
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
            count += 1;
            in_word = false;
        } else {
            in_word = false;
        }
    }

    count
}
