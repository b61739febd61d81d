use discover_models::NormalizedQuery;
use sha2::{Digest, Sha256};

/// Closed stopword set (spec §4.1). Kept sorted for readability, not for
/// any behavioral reason.
const STOPWORDS: &[&str] = &[
    "a", "above", "after", "an", "and", "are", "as", "at", "be", "been", "before", "being",
    "below", "between", "by", "can", "could", "dare", "did", "do", "does", "during", "for",
    "from", "had", "has", "have", "in", "into", "is", "may", "might", "must", "need", "of",
    "on", "or", "ought", "shall", "should", "the", "through", "to", "under", "used", "was",
    "were", "will", "with", "would",
];

/// Canonicalize free text into a stable, order- and case-insensitive form
/// (spec §4.1, steps 1-7).
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let filtered: String = lowered
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' || c == '-' { c } else { ' ' })
        .collect();

    let collapsed = filtered
        .split(|c: char| c == ' ' || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut tokens: Vec<&str> = collapsed
        .split(' ')
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(w))
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// First 16 hex characters (64 bits) of the SHA-256 digest over the
/// normalized query's UTF-8 bytes.
pub fn digest(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// Stable cache key for the query-digest cache (C4) and the session
/// materializer (C9).
pub fn cache_key(raw: &str) -> String {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        "query:v1:empty".to_string()
    } else {
        format!("query:v1:{}", digest(&normalized))
    }
}

pub fn normalize_query(raw: &str) -> NormalizedQuery {
    let normalized = normalize(raw);
    let digest_key = if normalized.is_empty() {
        "empty".to_string()
    } else {
        digest(&normalized)
    };

    NormalizedQuery {
        original: raw.to_string(),
        normalized,
        digest_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_stopwords_and_sorts() {
        assert_eq!(normalize("The Best Anime Edits"), "anime best edits");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("Gaming  --  Channels!!");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_is_commutative_over_token_order() {
        assert_eq!(normalize("anime edits"), normalize("edits anime"));
    }

    #[test]
    fn identical_normalized_forms_share_a_cache_key() {
        assert_eq!(cache_key("Anime Edits"), cache_key("edits anime"));
    }

    #[test]
    fn empty_after_normalization_uses_the_sentinel_key() {
        assert_eq!(cache_key("the and or"), "query:v1:empty");
    }
}
