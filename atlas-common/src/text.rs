//! Text normalization shared by tag ingestion and name lookup

/// Normalize a tag or artist name for comparison:
/// - strip leading/trailing whitespace
/// - collapse internal whitespace to a single space
/// - lowercase
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
