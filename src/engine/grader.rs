//! All-or-nothing grading.

use std::collections::BTreeSet;

use crate::models::question::normalize_key;

/// Trimmed, lowercased, deduplicated set of submitted keys.
pub fn normalize_selection<S: AsRef<str>>(selected: &[S]) -> BTreeSet<String> {
    selected.iter().map(|k| normalize_key(k.as_ref())).collect()
}

/// True iff the deduplicated selection equals the correct set exactly.
/// No partial credit: a missing or an extra key makes the answer wrong.
pub fn is_fully_correct<S: AsRef<str>>(selected: &[S], correct: &BTreeSet<String>) -> bool {
    normalize_selection(selected) == *correct
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        assert!(is_fully_correct(&["a", "b"], &set(&["a", "b"])));
        assert!(is_fully_correct(&["b", "a"], &set(&["a", "b"])));
    }

    #[test]
    fn test_missing_option() {
        assert!(!is_fully_correct(&["a"], &set(&["a", "b"])));
    }

    #[test]
    fn test_extra_option() {
        assert!(!is_fully_correct(&["a", "b", "c"], &set(&["a", "b"])));
        assert!(!is_fully_correct(&["a", "d"], &set(&["a"])));
    }

    #[test]
    fn test_duplicate_option_does_not_fill_the_set() {
        assert!(!is_fully_correct(&["a", "a"], &set(&["a", "b"])));
    }

    #[test]
    fn test_duplicates_of_a_full_answer_are_ignored() {
        assert!(is_fully_correct(&["a", "c", "a"], &set(&["a", "c"])));
    }

    #[test]
    fn test_empty_selection_is_wrong() {
        let empty: [&str; 0] = [];
        assert!(!is_fully_correct(&empty, &set(&["a"])));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        assert!(is_fully_correct(&["A", " c"], &set(&["a", "c"])));
    }

    #[test]
    fn test_dedup_symmetry() {
        let correct = set(&["a", "b"]);
        let samples: [&[&str]; 5] = [&["a"], &["a", "a"], &["a", "b", "b"], &["b", "a"], &["c"]];
        for s in samples {
            let deduped: Vec<String> = normalize_selection(s).into_iter().collect();
            assert_eq!(is_fully_correct(s, &correct), is_fully_correct(&deduped, &correct));
        }
    }

    #[test]
    fn test_correct_set_matches_itself() {
        for c in [set(&["a"]), set(&["a", "c"]), set(&["a", "b", "c", "d"])] {
            let keys: Vec<String> = c.iter().cloned().collect();
            assert!(is_fully_correct(&keys, &c));
        }
    }
}
