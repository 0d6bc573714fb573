//! Sentence tokenization
//!
//! Splits a sentence into lowercase alphanumeric tokens, dropping
//! punctuation. Matches the normalization the word repository applies to
//! submitted words, so lookups agree on the key.

/// Tokenize a sentence into normalized words
pub fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace_and_punctuation() {
        assert_eq!(
            tokenize("The cat, predictably, sat!"),
            vec!["the", "cat", "predictably", "sat"]
        );
    }

    #[test]
    fn test_lowercases_tokens() {
        assert_eq!(tokenize("Ephemeral THINGS"), vec!["ephemeral", "things"]);
    }

    #[test]
    fn test_keeps_duplicates_and_order() {
        assert_eq!(
            tokenize("word by word by word"),
            vec!["word", "by", "word", "by", "word"]
        );
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("?!... --").is_empty());
    }

    #[test]
    fn test_keeps_digits() {
        assert_eq!(tokenize("route 66"), vec!["route", "66"]);
    }
}
