use crate::error::{DepError, Result};
use regex::Regex;

/// Shell-style name matcher supporting `*` and `?`.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    regex: Regex,
}

impl GlobMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(DepError::InvalidInput(
                "Ignore pattern cannot be empty".to_string(),
            ));
        }

        let regex = Self::compile_glob(trimmed)?;
        Ok(Self {
            pattern: trimmed.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    fn compile_glob(pattern: &str) -> Result<Regex> {
        let mut regex = String::from("^");
        for ch in pattern.chars() {
            match ch {
                '*' => regex.push_str("[^/]*"),
                '?' => regex.push_str("[^/]"),
                '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                    regex.push('\\');
                    regex.push(ch);
                }
                _ => regex.push(ch),
            }
        }
        regex.push('$');

        Regex::new(&regex).map_err(|e| {
            DepError::InvalidInput(format!("Invalid ignore pattern '{}': {}", pattern, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_name_matches_exactly() {
        let matcher = GlobMatcher::new("vendor").unwrap();
        assert!(matcher.matches("vendor"));
        assert!(!matcher.matches("vendors"));
    }

    #[test]
    fn wildcards() {
        let star = GlobMatcher::new("node_*").unwrap();
        assert!(star.matches("node_modules"));
        assert!(!star.matches("modules"));

        let question = GlobMatcher::new("tmp?").unwrap();
        assert!(question.matches("tmp1"));
        assert!(!question.matches("tmp"));
    }

    #[test]
    fn dots_are_literal() {
        let matcher = GlobMatcher::new("*.gemspec").unwrap();
        assert!(matcher.matches("rails.gemspec"));
        assert!(!matcher.matches("railsXgemspec"));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let matcher = GlobMatcher::new("vendor/").unwrap();
        assert_eq!(matcher.pattern(), "vendor");
        assert!(matcher.matches("vendor"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(GlobMatcher::new("  ").is_err());
    }
}
