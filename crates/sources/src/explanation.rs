//! Human-readable justifications for recommendations.
//!
//! Content explanations are plain substring checks of each interest term
//! against the program's lowercase description and tags. They describe the
//! similarity score; they do not judge relevance on their own.

use data_loader::Program;

/// Explanation attached to every collaborative match
pub const COLLABORATIVE_EXPLANATION: &str = "Users with similar interests also liked this program.";

/// Explanation for a blended result with no content explanation
pub const HYBRID_EXPLANATION: &str =
    "Recommended based on your interests and similar user preferences.";

/// Interest terms found in `match_text`, in the order the user gave them.
///
/// Terms are split on commas, trimmed and lowercased. Empty terms are
/// skipped rather than treated as matching everything, which a literal
/// empty-substring check would do.
pub fn matched_interests(interests: &str, match_text: &str) -> Vec<String> {
    interests
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty() && match_text.contains(term.as_str()))
        .collect()
}

/// Explain a content match between `interests` and `program`
pub fn explain_content_match(interests: &str, program: &Program) -> String {
    let matches = matched_interests(interests, &program.match_text);

    let matched_text = match matches.as_slice() {
        [] => {
            return format!(
                "This program focuses on {}, which may align with your background and interests.",
                program.tags_text
            );
        }
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [first, second, ..] => format!("{}, {}, and others", first, second),
    };

    format!(
        "Recommended because you're interested in {}, and this program focuses on {}.",
        matched_text, program.tags_text
    )
}
