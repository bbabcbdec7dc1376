use std::collections::BTreeSet;

/// Words that carry no matching signal: club suffixes, competition noise and
/// generic English filler. Matched as whole words, case-insensitive.
const STOPWORDS: &[&str] = &[
    "fc", "utd", "united", "city", "ac", "cf", "sc", "tsv", "sv", "fk", "sk", "draw", "the",
    "and", "or", "of", "a", "an",
];

const MIN_TOKEN_LEN: usize = 3;

/// Reduce a free-text pick or fixture label to its significant words.
///
/// Lowercases, drops stopwords on word boundaries, strips everything that is
/// not alphanumeric, then keeps words of at least three characters. The result
/// is a set: order and duplicates are irrelevant to matching. An empty set
/// means the text can never match anything.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() >= MIN_TOKEN_LEN)
        .filter(|w| !STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn strips_club_suffixes() {
        assert_eq!(tokenize("Manchester United FC"), set(&["manchester"]));
    }

    #[test]
    fn short_words_are_dropped() {
        assert_eq!(tokenize("AC Lyon"), set(&["lyon"]));
    }

    #[test]
    fn punctuation_splits_words() {
        assert_eq!(
            tokenize("Real Madrid - Atlético (home win)"),
            set(&["real", "madrid", "atl", "tico", "home", "win"])
        );
    }

    #[test]
    fn empty_and_noise_only_yield_empty_set() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("FC Utd of a").is_empty());
        assert!(tokenize("---  !!").is_empty());
    }

    #[test]
    fn deterministic_and_deduplicated() {
        let a = tokenize("Arsenal Arsenal to beat Chelsea");
        let b = tokenize("Arsenal Arsenal to beat Chelsea");
        assert_eq!(a, b);
        assert_eq!(a, set(&["arsenal", "beat", "chelsea"]));
    }

    #[test]
    fn draw_is_noise() {
        assert_eq!(tokenize("Draw or Villarreal"), set(&["villarreal"]));
    }
}
