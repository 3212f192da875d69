use crate::language::LanguageSelection;

/// Cache key for a translation.
///
/// Keys are opaque MD5 hashes of all relevant inputs, ensuring:
/// - Same text + languages + model = same key
/// - Any change to inputs produces a different key
/// - Keys are fixed-length (32 hex chars) for consistent storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: String,
}

impl CacheKey {
    pub fn new(text: &str, languages: &LanguageSelection, model: &str) -> Self {
        // Null bytes as separators prevent collision between
        // inputs like ("a", "bc") and ("ab", "c").
        let combined = format!(
            "{}\0{}\0{}\0{}",
            text,
            languages.source().as_str(),
            languages.target().as_str(),
            model,
        );

        Self {
            hash: format!("{:x}", md5::compute(combined.as_bytes())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}
