//! Lightweight fuzzy scorer for palette queries.
//!
//! Two bands, checked in order:
//! 1. case-insensitive substring: `1 - match_pos / candidate_len`, so an
//!    earlier hit outranks a later one and a hit at position 0 scores 1.0;
//! 2. greedy in-order subsequence: `query_len / chars_walked`, where the
//!    walk stops at the last matched char. Spread-out matches dilute the
//!    score toward 0.
//!
//! Scores always land in [0, 1]. The empty query scores 1.0 so an empty
//! fuzzy-mode query passes every candidate through to ranking.

use crate::model::SearchItem;

/// Score `query` against a single candidate string.
pub fn score(query: &str, candidate: &str) -> f32 {
    if query.is_empty() {
        return 1.0;
    }
    if candidate.is_empty() {
        return 0.0;
    }

    let needle = query.to_lowercase();
    let haystack = candidate.to_lowercase();

    if let Some(byte_pos) = haystack.find(&needle) {
        let char_pos = haystack[..byte_pos].chars().count();
        let len = haystack.chars().count();
        return 1.0 - (char_pos as f32 / len as f32);
    }

    subsequence_score(&needle, &haystack)
}

/// Score `query` against an item, taking the best field hit.
pub fn score_item(query: &str, item: &SearchItem) -> f32 {
    item.match_fields()
        .map(|field| score(query, field))
        .fold(0.0_f32, f32::max)
}

/// Greedy left-to-right walk: consume candidate chars until every query
/// char has been seen in order. Tighter packing means fewer chars walked
/// and a higher score.
fn subsequence_score(needle: &str, haystack: &str) -> f32 {
    let needle_len = needle.chars().count();
    let mut wanted = needle.chars().peekable();
    let mut walked = 0usize;

    for ch in haystack.chars() {
        walked += 1;
        if wanted.peek() == Some(&ch) {
            wanted.next();
            if wanted.peek().is_none() {
                return needle_len as f32 / walked as f32;
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use proptest::prelude::*;

    #[test]
    fn empty_query_scores_one() {
        assert_eq!(score("", "Mathematics"), 1.0);
        assert_eq!(score("", ""), 1.0);
    }

    #[test]
    fn substring_at_start_scores_one() {
        assert_eq!(score("mat", "Mathematics"), 1.0);
        assert_eq!(score("MAT", "mathematics"), 1.0);
    }

    #[test]
    fn earlier_substring_outranks_later() {
        let early = score("eng", "English");
        let late = score("eng", "Bioengineering");
        assert!(early > late);
        assert!(late > 0.0);
    }

    #[test]
    fn subsequence_scores_between_zero_and_substring() {
        // m..t..s spread over "mathematics": 3 query chars, 11 walked.
        let spread = score("mts", "Mathematics");
        assert!((spread - 3.0 / 11.0).abs() < 1e-6);
        assert!(spread < score("mat", "Mathematics"));
    }

    #[test]
    fn missing_char_scores_zero() {
        assert_eq!(score("xyz", "English"), 0.0);
        assert_eq!(score("q", ""), 0.0);
    }

    #[test]
    fn item_score_takes_best_field() {
        let item = SearchItem::new("page-tt", "Timetable", ItemKind::Page, "/timetable")
            .with_description("Weekly lesson plan")
            .with_keywords(["schedule", "classes"]);
        assert_eq!(score_item("schedule", &item), 1.0);
        assert!(score_item("lesson", &item) > 0.5);
        assert_eq!(score_item("zzz", &item), 0.0);
    }

    proptest! {
        #[test]
        fn score_stays_in_unit_interval(query in ".{0,16}", candidate in ".{0,64}") {
            let s = score(&query, &candidate);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
