//! Paraphrase variants so short keywords match stored "What is ...?" questions.

/// Queries with at most this many tokens also get definitional variants.
pub const DEFINITIONAL_TOKEN_LIMIT: usize = 3;

const EDGE_PUNCTUATION: &[char] = &[' ', '?', '!', '.', ',', ';', ':'];

/// Produces ordered, duplicate-free query variants.
///
/// The first variant is always the trimmed input. An input that normalizes
/// to nothing (blank, or only punctuation) yields no variants.
///
/// # Example
/// ```
/// # use answer_engine::expand_queries;
/// assert_eq!(
///     expand_queries("bias"),
///     ["bias", "what is bias?", "define bias", "definition of bias", "explain bias"]
/// );
/// ```
pub fn expand_queries(text: &str) -> Vec<String> {
    let q = text.trim();
    if q.is_empty() {
        return Vec::new();
    }
    let normalized = q.to_lowercase();
    let normalized = normalized.trim_matches(EDGE_PUNCTUATION);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![q.to_string(), normalized.to_string()];
    if normalized.split_whitespace().count() <= DEFINITIONAL_TOKEN_LIMIT {
        variants.push(format!("what is {normalized}?"));
        variants.push(format!("define {normalized}"));
        variants.push(format!("definition of {normalized}"));
        variants.push(format!("explain {normalized}"));
    }

    let mut uniq: Vec<String> = Vec::with_capacity(variants.len());
    for v in variants {
        if !uniq.contains(&v) {
            uniq.push(v);
        }
    }
    uniq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_case_keeps_original_then_normalized() {
        assert_eq!(
            expand_queries("  Overfitting? "),
            [
                "Overfitting?",
                "overfitting",
                "what is overfitting?",
                "define overfitting",
                "definition of overfitting",
                "explain overfitting",
            ]
        );
    }

    #[test]
    fn long_questions_get_no_definitional_variants() {
        let v = expand_queries("How does gradient descent find a minimum?");
        assert_eq!(
            v,
            [
                "How does gradient descent find a minimum?",
                "how does gradient descent find a minimum",
            ]
        );
    }

    #[test]
    fn token_limit_is_inclusive() {
        assert_eq!(expand_queries("Bias variance tradeoff").len(), 6);
        assert_eq!(expand_queries("bias variance tradeoff").len(), 5);
        assert_eq!(expand_queries("The bias variance tradeoff").len(), 2);
    }

    #[test]
    fn blank_or_punctuation_only_yields_nothing() {
        assert!(expand_queries("   ").is_empty());
        assert!(expand_queries(" ?!. ").is_empty());
    }
}
