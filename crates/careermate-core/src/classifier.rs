//! Keyword routing between the maps-grounded path and the conversational path.

/// Phrases that mark a message as a location query. Any match wins.
pub const MAPS_KEYWORDS: &[&str] = &[
    "nearby",
    "directions to",
    "where is",
    "map of",
    "find",
    "restaurants",
    "coffee shops",
    "parks",
    "gas stations",
    "how do i get to",
];

/// Returns true when `text` should be answered with maps grounding.
///
/// Matching is a case-insensitive substring test, so "Find me a job" routes
/// to the grounded path too. Blank input must be filtered out by the caller.
pub fn is_maps_query(text: &str) -> bool {
    let lowered = text.to_lowercase();
    MAPS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}
