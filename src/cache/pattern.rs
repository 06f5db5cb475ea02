//! Key patterns for bulk invalidation.

use regex::Regex;

/// Selects keys for `invalidate_pattern`.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Key contains the text anywhere
    Substring(String),
    /// Key matches the regular expression
    Regex(Regex),
}

impl KeyPattern {
    /// Compiles a regular-expression pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(KeyPattern::Regex)
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Substring(needle) => key.contains(needle.as_str()),
            KeyPattern::Regex(re) => re.is_match(key),
        }
    }
}

impl From<&str> for KeyPattern {
    fn from(value: &str) -> Self {
        KeyPattern::Substring(value.to_string())
    }
}

impl From<String> for KeyPattern {
    fn from(value: String) -> Self {
        KeyPattern::Substring(value)
    }
}

impl From<Regex> for KeyPattern {
    fn from(value: Regex) -> Self {
        KeyPattern::Regex(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_matches_anywhere() {
        let pattern = KeyPattern::from("user:");
        assert!(pattern.matches("user:1"));
        assert!(pattern.matches("admin:user:1"));
        assert!(!pattern.matches("users"));
    }

    #[test]
    fn test_regex_anchoring_is_respected() {
        let pattern = KeyPattern::regex(r"^properties:\d+$").unwrap();
        assert!(pattern.matches("properties:42"));
        assert!(!pattern.matches("properties:list"));
        assert!(!pattern.matches("x:properties:42"));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(KeyPattern::regex("(unclosed").is_err());
    }
}
