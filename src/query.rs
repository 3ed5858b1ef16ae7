//! Candidate query expansion.
//!
//! A refined query such as `"mitochondria, cell structure"` is tried first as
//! a whole and then as its comma-separated concepts, in that order.

/// Expand an effective query into the ordered list of searches to attempt.
///
/// The first entry is always the effective query itself. Each trimmed,
/// non-empty comma segment follows in first-seen order; duplicates of an
/// earlier entry are dropped.
pub fn candidate_queries(effective: &str) -> Vec<String> {
    let mut candidates = vec![effective.to_string()];
    for part in effective.split(',').map(str::trim) {
        if part.is_empty() || candidates.iter().any(|c| c == part) {
            continue;
        }
        candidates.push(part.to_string());
    }
    candidates
}

/// Expand a query with a disjunction of diagram-like terms.
///
/// `fallback_query("mitochondria", &["diagram", "schematic"])` yields
/// `"mitochondria (diagram OR schematic)"`. With no terms the query is
/// returned unchanged.
pub fn fallback_query<S: AsRef<str>>(effective: &str, terms: &[S]) -> String {
    if terms.is_empty() {
        return effective.to_string();
    }
    let disjunction = terms
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{effective} ({disjunction})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_concept_yields_single_candidate() {
        assert_eq!(
            candidate_queries("quadratic equation"),
            vec!["quadratic equation"]
        );
    }

    #[test]
    fn comma_segments_follow_whole_query() {
        assert_eq!(
            candidate_queries("mitochondria, cell structure"),
            vec!["mitochondria, cell structure", "mitochondria", "cell structure"]
        );
    }

    #[test]
    fn empty_and_repeated_segments_are_dropped() {
        assert_eq!(
            candidate_queries("heart, , heart,valve "),
            vec!["heart, , heart,valve ", "heart", "valve"]
        );
    }

    #[test]
    fn segment_equal_to_whole_query_is_not_repeated() {
        assert_eq!(candidate_queries("heart,"), vec!["heart,", "heart"]);
        assert_eq!(candidate_queries("heart"), vec!["heart"]);
    }

    #[test]
    fn fallback_joins_terms_with_or() {
        assert_eq!(
            fallback_query("black hole", &["diagram", "schematic", "illustration"]),
            "black hole (diagram OR schematic OR illustration)"
        );
    }

    #[test]
    fn fallback_without_terms_is_identity() {
        let terms: [&str; 0] = [];
        assert_eq!(fallback_query("black hole", &terms), "black hole");
    }
}
