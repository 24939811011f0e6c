// Keyword flagger - scans investment chat messages for scam vocabulary.
//
// Matching is plain substring containment on the lowercased message.
// There is no tokenization or word-boundary check, so "bitcoinx" still
// matches "bitcoin".

/// Phrases that mark a chat message as suspicious.
pub const SUSPICIOUS_KEYWORDS: [&str; 6] = [
    "western union",
    "money transfer",
    "bitcoin",
    "crypto",
    "upfront payment",
    "bank details",
];

/// Return every keyword contained in `message`, in list order.
pub fn find_suspicious_keywords(message: &str) -> Vec<&'static str> {
    let lowered = message.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lowered.contains(keyword))
        .collect()
}

/// Reason stored on a message flagged by the keyword scan.
pub fn flag_reason(matches: &[&str]) -> String {
    format!("Suspicious keywords: {}", matches.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_message_has_no_matches() {
        assert!(find_suspicious_keywords("Is the roof new?").is_empty());
        assert!(find_suspicious_keywords("").is_empty());
    }

    #[test]
    fn test_every_keyword_matches_in_any_case() {
        for keyword in SUSPICIOUS_KEYWORDS {
            let shouted = format!("please use {} today", keyword.to_uppercase());
            assert_eq!(find_suspicious_keywords(&shouted), vec![keyword]);
        }
    }

    #[test]
    fn test_substring_match_ignores_word_boundaries() {
        assert_eq!(find_suspicious_keywords("I use Bitcoin"), vec!["bitcoin"]);
        assert_eq!(find_suspicious_keywords("BITCOIN"), vec!["bitcoin"]);
        assert_eq!(find_suspicious_keywords("bitcoinx"), vec!["bitcoin"]);
        assert_eq!(find_suspicious_keywords("cryptocurrency"), vec!["crypto"]);
    }

    #[test]
    fn test_multiple_matches_follow_list_order() {
        let matches =
            find_suspicious_keywords("Send your bank details, then pay in crypto via Western Union");
        assert_eq!(matches, vec!["western union", "crypto", "bank details"]);
    }

    #[test]
    fn test_flag_reason_lists_matches() {
        assert_eq!(
            flag_reason(&["bitcoin", "upfront payment"]),
            "Suspicious keywords: bitcoin, upfront payment"
        );
    }
}
