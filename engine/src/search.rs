use crate::index::{DocId, PositionalIndex};

/// Documents in which `first` and `second` occur within `max_distance` of
/// each other.
///
/// With `strict_order` set, `second` must occur after `first`; otherwise
/// either order matches. The match window spans `max_distance + 1` positions
/// rather than `max_distance`: `[1, max_distance + 1]` in strict mode,
/// symmetric around the start position otherwise. The extra position is part
/// of the query contract, not a bug; do not tighten the boundary.
///
/// A token absent from the index yields an empty result, not an error.
/// Results keep the ascending document-id order of the candidate
/// intersection.
pub fn positional_search(
    index: &PositionalIndex,
    first: &str,
    second: &str,
    max_distance: u32,
    strict_order: bool,
) -> Vec<DocId> {
    let (Some(first_docs), Some(second_docs)) =
        (index.postings.get(first), index.postings.get(second))
    else {
        return Vec::new();
    };

    let window = i64::from(max_distance) + 1;
    let offsets = if strict_order { 1..=window } else { -window..=window };

    let mut matches = Vec::new();
    for (doc_id, first_positions) in first_docs {
        let Some(second_positions) = second_docs.get(doc_id) else {
            continue;
        };
        // Position lists are value sets here; no sortedness is assumed.
        let hit = first_positions.iter().any(|&start| {
            offsets.clone().any(|offset| {
                if offset == 0 {
                    return false;
                }
                u32::try_from(i64::from(start) + offset)
                    .is_ok_and(|target| second_positions.contains(&target))
            })
        });
        if hit {
            matches.push(*doc_id);
        }
    }
    matches
}

/// Documents containing `tokens` as a contiguous phrase, in order.
///
/// A single-token phrase returns every document holding that token. Longer
/// phrases chain a strict-order, distance-zero positional search over each
/// adjacent pair and intersect the per-pair results left to right; pairwise
/// adjacency is enough to pin the whole phrase contiguous and in order.
pub fn phrase_search(index: &PositionalIndex, tokens: &[String]) -> Vec<DocId> {
    match tokens {
        [] => Vec::new(),
        [token] => index
            .postings
            .get(token.as_str())
            .map(|documents| documents.keys().copied().collect())
            .unwrap_or_default(),
        _ => {
            let mut matches: Option<Vec<DocId>> = None;
            for pair in tokens.windows(2) {
                let next = positional_search(index, &pair[0], &pair[1], 0, true);
                matches = Some(match matches {
                    Some(current) => current.into_iter().filter(|d| next.contains(d)).collect(),
                    None => next,
                });
                if matches.as_ref().is_some_and(|m| m.is_empty()) {
                    break;
                }
            }
            matches.unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::index::TokenPositions;
    use crate::tokenizer::tokenize;

    /// Index the given documents from raw text, ids assigned in order.
    fn index_texts(texts: &[&str]) -> PositionalIndex {
        let mut documents = BTreeMap::new();
        for (doc_id, text) in texts.iter().enumerate() {
            let mut positions = TokenPositions::new();
            for (position, token) in tokenize(text).into_iter().enumerate() {
                positions.entry(token).or_default().push(position as u32);
            }
            documents.insert(doc_id as DocId + 1, positions);
        }
        let mut index = PositionalIndex::new();
        index.merge(documents);
        index
    }

    fn phrase(index: &PositionalIndex, text: &str) -> Vec<DocId> {
        phrase_search(index, &tokenize(text))
    }

    #[test]
    fn distance_window_spans_max_distance_plus_one() {
        let index = index_texts(&["apple fresh banana"]);
        // apple..banana are two apart; max_distance=1 widens the window to 2.
        assert_eq!(positional_search(&index, "apple", "banana", 1, false), vec![1]);
        assert!(positional_search(&index, "apple", "banana", 0, false).is_empty());
    }

    #[test]
    fn adjacent_tokens_match_at_distance_zero() {
        let index = index_texts(&["apple fresh banana"]);
        assert_eq!(positional_search(&index, "apple", "fresh", 0, false), vec![1]);
    }

    #[test]
    fn absent_token_short_circuits_to_empty() {
        let index = index_texts(&["apple fresh banana"]);
        assert!(positional_search(&index, "apple", "kiwi", 5, false).is_empty());
        assert!(positional_search(&index, "kiwi", "apple", 5, false).is_empty());
        assert!(phrase(&index, "kiwi").is_empty());
        assert!(phrase(&index, "apple kiwi").is_empty());
    }

    #[test]
    fn non_strict_search_is_symmetric() {
        let index = index_texts(&[
            "banana then apple",
            "apple then banana",
            "apple alone here",
            "banana far far far far away apple",
        ]);
        for distance in 0..4 {
            assert_eq!(
                positional_search(&index, "apple", "banana", distance, false),
                positional_search(&index, "banana", "apple", distance, false),
            );
        }
    }

    #[test]
    fn strict_order_requires_second_token_after_first() {
        let index = index_texts(&["banana apple"]);
        assert_eq!(positional_search(&index, "banana", "apple", 0, true), vec![1]);
        assert!(positional_search(&index, "apple", "banana", 0, true).is_empty());
    }

    #[test]
    fn candidate_documents_come_back_in_ascending_id_order() {
        let index = index_texts(&["oil price", "price of oil", "oil price again"]);
        assert_eq!(positional_search(&index, "oil", "price", 1, false), vec![1, 2, 3]);
    }

    #[test]
    fn single_token_phrase_returns_all_documents_with_that_token() {
        let index = index_texts(&["oil up", "gold up", "oil down"]);
        assert_eq!(phrase(&index, "oil"), vec![1, 3]);
    }

    #[test]
    fn phrase_requires_contiguous_in_order_tokens() {
        let index = index_texts(&[
            "the new york times reported today",
            "new times york",
            "york new times",
        ]);
        assert_eq!(phrase(&index, "new york times"), vec![1]);
    }

    #[test]
    fn phrase_rejects_gapped_occurrences() {
        let index = index_texts(&["apple x banana", "banana apple"]);
        assert!(phrase(&index, "apple banana").is_empty());
    }

    #[test]
    fn repeated_token_phrase_needs_a_true_run() {
        // Pairwise chaining must not be fooled by scattered repeats.
        let index = index_texts(&["the the the end", "the one the two the"]);
        assert_eq!(phrase(&index, "the the the"), vec![1]);
        assert_eq!(phrase(&index, "the the"), vec![1]);
    }

    #[test]
    fn phrase_across_documents_does_not_match() {
        // Every adjacent pair must match within the same document.
        let index = index_texts(&["crude oil", "oil prices"]);
        assert!(phrase(&index, "crude oil prices").is_empty());
        assert_eq!(phrase(&index, "crude oil"), vec![1]);
        assert_eq!(phrase(&index, "oil prices"), vec![2]);
    }
}
